//! SQL access, one module per table. Functions take the pool and return
//! `sqlx::Error` so callers can tell unique violations apart from other failures.

pub mod activity;
pub mod comment;
pub mod disease;
pub mod post;
pub mod scan_history;
pub mod user;
