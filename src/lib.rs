//! # Plantheon Backend Library
//!
//! REST backend for a plant-care application: user accounts with roles, a plant
//! disease catalog with spreadsheet import, a shared activity calendar, a small
//! social feed and per-user scan history.
//!
//! ## Architecture
//!
//! The application is built using:
//! - **Axum**: HTTP server, routing and extractors
//! - **SQLx**: Asynchronous database operations with SQLite
//! - **Tokio**: Async runtime
//! - **Serde**: Serialization/deserialization for JSON APIs
//!
//! Every request follows the same path: route → extractor (auth) → validator →
//! store call → JSON envelope.
//!
//! ## Core Components
//!
//! - [`config`]: Application configuration management
//! - [`db`]: Database schema initialization and timestamp encoding
//! - [`error`]: Centralized error handling and HTTP error responses
//! - [`auth`]: Bearer tokens and password hashing
//! - [`validation`]: Request field rules
//! - [`calendar`]: Month calendar aggregation
//! - [`import`]: CSV / XLSX disease import
//! - [`metrics`]: In-process counters
//! - [`middleware`]: Auth extractors, rate limiting, request validation, security headers
//! - [`models`]: Row types and DTOs
//! - [`store`]: SQL access per table
//! - [`routes`]: HTTP API endpoint handlers
//! - [`state`]: Shared application state
//! - [`types`]: Response envelope, pagination and patch helpers

pub mod auth;
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod tests;
