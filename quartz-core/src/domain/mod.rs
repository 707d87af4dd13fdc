//! Core domain types
//!
//! These types represent the fundamental business entities and are shared between
//! the orchestrator (which persists them) and the client/CLI (which display them).

pub mod job;
