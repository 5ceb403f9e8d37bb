//! Submission DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::dto::FormatResponse;
use crate::models::{Bitstream, BitstreamFormat, WorkspaceItem};
use crate::services::{BundleView, SubmissionView, UploadOutcome};
use crate::submit::StepStatus;

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for starting a submission.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSubmissionRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    #[schema(min_length = 1, max_length = 255, example = "Library Research Award 2026")]
    pub title: String,
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedSubmissionResponse {
    pub id: i32,
    pub item_id: i32,
    pub created_at: String,
}

impl From<WorkspaceItem> for CreatedSubmissionResponse {
    fn from(ws: WorkspaceItem) -> Self {
        Self {
            id: ws.id,
            item_id: ws.item_id,
            created_at: ws.created_at.to_jiff().to_string(),
        }
    }
}

/// A stored file.
#[derive(Debug, Serialize, ToSchema)]
pub struct BitstreamResponse {
    pub id: i32,
    pub name: String,
    /// Path as sent by the client
    pub source: String,
    /// Required-file category the submitter chose
    pub description: Option<String>,
    pub size_bytes: i64,
    pub format: Option<FormatResponse>,
    /// Submitter's description of an unrecognised format
    pub user_format_description: Option<String>,
}

impl From<(Bitstream, Option<BitstreamFormat>)> for BitstreamResponse {
    fn from((bitstream, format): (Bitstream, Option<BitstreamFormat>)) -> Self {
        Self {
            id: bitstream.id,
            name: bitstream.name,
            source: bitstream.source,
            description: bitstream.description,
            size_bytes: bitstream.size_bytes,
            format: format.map(FormatResponse::from),
            user_format_description: bitstream.user_format_description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BundleResponse {
    pub id: i32,
    #[schema(example = "ORIGINAL")]
    pub name: String,
    pub primary_bitstream_id: Option<i32>,
    pub files: Vec<BitstreamResponse>,
}

impl From<BundleView> for BundleResponse {
    fn from(view: BundleView) -> Self {
        Self {
            id: view.bundle.id,
            name: view.bundle.name,
            primary_bitstream_id: view.bundle.primary_bitstream_id,
            files: view.files.into_iter().map(BitstreamResponse::from).collect(),
        }
    }
}

/// A submission with the files uploaded so far.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionResponse {
    pub id: i32,
    pub item_id: i32,
    pub title: String,
    pub last_modified: String,
    pub bundles: Vec<BundleResponse>,
    /// Bitstream whose details this session is editing
    pub editing_bitstream_id: Option<i32>,
    /// Required categories not yet uploaded, in display order
    pub needed_files: Vec<String>,
    #[schema(example = "Application Form, Essay, Research Paper, Bibliography, and Letter of Support")]
    pub required_files: String,
}

impl From<SubmissionView> for SubmissionResponse {
    fn from(view: SubmissionView) -> Self {
        Self {
            id: view.workspace_item.id,
            item_id: view.item.id,
            title: view.item.title,
            last_modified: view.item.last_modified.to_jiff().to_string(),
            bundles: view.bundles.into_iter().map(BundleResponse::from).collect(),
            editing_bitstream_id: view.editing_bitstream,
            needed_files: view.needed_files,
            required_files: view.required_files,
        }
    }
}

/// Outcome of one pass through the upload step.
///
/// Outcomes are returned with HTTP 200; `code` is zero only on success.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "status": "missing_bitstreams",
    "code": 30,
    "message": "Some required files have not been uploaded",
    "editing_bitstream_id": 12,
    "needed_files": ["Bibliography"],
    "required_files": "Application Form, Essay, Research Paper, Bibliography, and Letter of Support"
}))]
pub struct UploadResponse {
    pub status: StepStatus,
    pub code: i32,
    pub message: String,
    pub editing_bitstream_id: Option<i32>,
    pub needed_files: Vec<String>,
    pub required_files: String,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        Self {
            status: outcome.status,
            code: outcome.status.code(),
            message: outcome.status.message().to_string(),
            editing_bitstream_id: outcome.editing_bitstream,
            needed_files: outcome.needed_files,
            required_files: outcome.required_files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_length_validated() {
        let empty = CreateSubmissionRequest { title: String::new() };
        assert!(empty.validate().is_err());

        let long = CreateSubmissionRequest { title: "x".repeat(256) };
        assert!(long.validate().is_err());

        let ok = CreateSubmissionRequest { title: "Award".to_string() };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_upload_response_carries_code() {
        let response = UploadResponse::from(UploadOutcome {
            status: StepStatus::NotPdf,
            editing_bitstream: None,
            needed_files: vec![],
            required_files: "A".to_string(),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "not_pdf");
        assert_eq!(json["code"], 35);
        assert_eq!(json["editing_bitstream_id"], serde_json::Value::Null);
    }
}
