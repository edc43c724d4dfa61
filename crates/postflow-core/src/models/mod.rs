//! Data models for the application
//!
//! This module contains all data structures used throughout the application,
//! organized by domain. Each sub-module represents a specific feature area.

mod grouping;
mod jobsite;
mod media;
mod post;
mod user;

// Re-export all models for convenient imports
pub use grouping::*;
pub use jobsite::*;
pub use media::*;
pub use post::*;
pub use user::*;
