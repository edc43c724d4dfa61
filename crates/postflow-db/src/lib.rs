//! Postflow database layer
//!
//! Postgres repositories for the grouping and scheduling engine, plus the
//! transaction utilities that keep multi-step runs atomic.

pub mod db;

pub use db::grouping::GroupingRepository;
pub use db::media::MediaRepository;
pub use db::post::PostRepository;
pub use db::transaction::{map_db_err, TransactionGuard};
pub use db::user::UserRepository;
