//! HTTP capability for external-call nodes.
//!
//! The engine only sees the [`HttpClient`] trait. [`ReqwestClient`] is the
//! default implementation; tests and embedders can supply their own.

mod client;
mod error;

pub use client::{HttpClient, HttpRequest, HttpResponse, ReqwestClient};
pub use error::HttpError;
