//! Azure ML webservice endpoint client and data models.
//!
//! Provides typed structures and an asynchronous client for listing, reading,
//! creating, updating and deleting the endpoints of an Azure ML webservice.
//!
//! Failure signalling differs per operation and per failure class:
//!
//! | operation | success | HTTP failure | transport failure |
//! |-----------|---------|--------------|-------------------|
//! | get / get-all | `Ok(Some(value))` | `Err(Error::Http)` | `Ok(None)` |
//! | list names | `Ok(names)` | `Err(Error::Http)` | `Err(Error::MissingData)` |
//! | create / delete / update | `Ok(true)` | `Err(Error::Http)` | `Ok(false)` |
//!
//! Deleting the `default` endpoint returns `Ok(false)` without a request.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{endpoints_url, EndpointsClient, EndpointsClientBuilder, DEFAULT_ENDPOINT};
pub use models::{
    endpoint_names, CreateEndpointRequest, Endpoint, Resource, ResourceLocation,
    UpdateEndpointRequest,
};

/// Convenient result alias that reuses the shared Azure ML error type.
pub type Result<T> = azureml_core::Result<T>;
