//! Post scheduler: assigns monotonic, floor-respecting publish slots to a
//! user's pending posts at the subscription plan's cadence.

pub mod cursor;
pub mod service;

pub use cursor::{plan_assignments, PostWithFloor, ScheduleCursor};
pub use service::SchedulerService;
