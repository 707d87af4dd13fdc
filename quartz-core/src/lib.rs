//! Quartz Core
//!
//! Core types shared by the Quartz deployment services.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, Cron)
//! - DTOs: Data transfer objects exchanged between orchestrator, client and CLI

pub mod domain;
pub mod dto;
