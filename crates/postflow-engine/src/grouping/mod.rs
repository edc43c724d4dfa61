//! Grouping selector: turns a jobsite's ungrouped media pool into a
//! committed grouping and its `not_scheduled` post.

pub mod policy;
pub mod service;

pub use policy::{select_media, GroupingPolicy};
pub use service::GroupingService;
