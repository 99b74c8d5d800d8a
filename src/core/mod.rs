//! Core business logic module
//!
//! This module contains the domain models, the acquisition job and the
//! pieces it is built from.

pub mod artifacts;
pub mod collector;
pub mod config;
pub mod conflict;
pub mod job;
pub mod models;
pub mod reporter;
pub mod scan;
pub mod url_store;
pub mod ytdlp;


// Re-export commonly used types
pub use config::AppConfig;
pub use job::AcquisitionJob;
