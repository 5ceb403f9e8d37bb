//! Service layer for business logic operations.
//!
//! Services own a unit-of-work boundary: each call opens a content store,
//! runs to completion, then commits or rolls back.

mod submission_service;

pub use submission_service::{BundleView, SubmissionService, SubmissionView, UploadOutcome};

use crate::content::ContentBackend;
use crate::submit::UploadStep;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap since the content backend shares its pool or map.
#[derive(Clone)]
pub struct Services {
    pub submissions: SubmissionService,
}

impl Services {
    pub fn new(content: ContentBackend, step: UploadStep) -> Self {
        Self {
            submissions: SubmissionService::new(content, step),
        }
    }
}
