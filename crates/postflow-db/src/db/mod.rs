//! Database repositories for data access layer
//!
//! Each repository owns the queries for one domain entity. Pool-based methods
//! serve boundary reads (catalog views, publisher polling); associated
//! functions taking a `Transaction` serve the steps of a grouping or
//! scheduling run, so a whole run commits or rolls back together.

pub mod grouping;
pub mod media;
pub mod post;
pub mod transaction;
pub mod user;
