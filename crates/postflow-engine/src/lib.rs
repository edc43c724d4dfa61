//! Postflow Engine
//!
//! This crate is the **business service layer**: media grouping selection,
//! publish-slot scheduling, and the caption manifest handed to the upstream
//! captioning collaborator. Selection and slot arithmetic are pure functions
//! over data already loaded from storage; the services wrap them in one
//! transaction per run so a run commits whole or not at all.

pub mod captioning;
pub mod grouping;
pub mod scheduling;

pub use captioning::{caption_manifest, CaptionManifest, CaptionMediaRef};
pub use grouping::{GroupingPolicy, GroupingService};
pub use scheduling::{plan_assignments, PostWithFloor, ScheduleCursor, SchedulerService};
