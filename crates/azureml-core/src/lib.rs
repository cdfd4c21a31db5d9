//! # azureml-core
//!
//! Core types and utilities for working with the Azure ML management API.
//!
//! This crate provides the shared error type, HTTP transport configuration and
//! workspace credentials used by the service client crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and the management API failure body
//! - [`config`] - Management configuration and workspace credentials
//! - [`client`] - HTTP transport settings

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{ManagementConfig, WorkspaceCredentials};
pub use error::{Error, Result};
