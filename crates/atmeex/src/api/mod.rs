//! HTTP transport for the Atmeex cloud API.

mod client;
mod endpoints;

pub(crate) use client::ApiClient;
pub(crate) use endpoints::*;
