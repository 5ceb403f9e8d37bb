//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `submission` - Submission and upload step DTOs
//! - `format` - Format registry entries
//! - `locale` - Resolved request locale
//! - `health` - Health probe responses
//! - `error` - Common error response DTOs

mod error;
mod format;
mod health;
mod locale;
mod submission;

pub use error::ErrorResponse;
pub use format::FormatResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use locale::LocaleResponse;
pub use submission::{
    BitstreamResponse, BundleResponse, CreateSubmissionRequest, CreatedSubmissionResponse,
    SubmissionResponse, UploadResponse,
};
