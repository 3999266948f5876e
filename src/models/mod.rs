//! Row types and request/response DTOs, one module per entity.

pub mod activity;
pub mod comment;
pub mod disease;
pub mod post;
pub mod scan_history;
pub mod user;
