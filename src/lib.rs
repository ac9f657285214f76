//! # taskboard
//!
//! HTTP backend for a sign-in gated task-tracking workspace.
//!
//! This library provides:
//! - A CRUD API over a document-style task store
//! - A normalization layer reconciling the overlapping `status` and
//!   `completed` fields into one canonical lifecycle
//! - Pluggable storage backends (SQLite, in-memory)
//!
//! ## Request flow
//! 1. The API surface shape-validates the untrusted JSON body
//! 2. The task store normalizes field content and persists the document
//! 3. Reads re-normalize every stored document, so legacy rows never leak
//!    an inconsistent status/completed pair
//!
//! ## Modules
//! - `api`: axum routes, wire types, and the task store
//! - `config`: environment-variable configuration
//! - `task`: the task domain model and reconciliation rule

pub mod api;
pub mod config;
pub mod task;

pub use config::Config;
