//! deposit-rs
//!
//! File upload step of an institutional repository's submission workflow,
//! with per-request locale resolution.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod cli;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod i18n;
pub mod logger;
pub mod models;
pub mod schema;
pub mod server;
pub mod services;
pub mod session;
pub mod state;
pub mod submit;
pub mod utils;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
