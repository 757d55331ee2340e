//! Core use-case services.
//!
//! # Responsibility
//! - Compose the repository views into use-case level APIs.
//! - Keep the excluded transport layer decoupled from storage details.

pub mod catalog_service;
