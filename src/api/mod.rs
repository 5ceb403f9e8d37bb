//! HTTP surface: submission and upload step endpoints, the format registry,
//! locale resolution and health probes.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
mod doc;
