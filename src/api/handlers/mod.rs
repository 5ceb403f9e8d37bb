//! HTTP request handlers for API endpoints.
//!
//! This module contains all request handlers organized by resource type.

pub mod formats;
pub mod health;
pub mod locale;
pub mod submissions;
