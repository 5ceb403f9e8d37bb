//! Bitstream format DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{BitstreamFormat, FormatSupportLevel};

/// Entry of the bitstream format registry.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 2,
    "short_description": "Adobe PDF",
    "mime_type": "application/pdf",
    "support_level": "known",
    "internal": false,
    "extensions": ["pdf"]
}))]
pub struct FormatResponse {
    pub id: i32,
    pub short_description: String,
    pub mime_type: String,
    pub support_level: FormatSupportLevel,
    pub internal: bool,
    pub extensions: Vec<String>,
}

impl From<BitstreamFormat> for FormatResponse {
    fn from(format: BitstreamFormat) -> Self {
        Self {
            id: format.id,
            short_description: format.short_description,
            mime_type: format.mime_type,
            support_level: format.support_level,
            internal: format.internal,
            extensions: format.extensions,
        }
    }
}
