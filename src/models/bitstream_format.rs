use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

/// How well the repository supports a format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, utoipa::ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::FormatSupportLevel")]
#[serde(rename_all = "lowercase")]
pub enum FormatSupportLevel {
    Unknown,
    Known,
    Supported,
}

/// Entry of the bitstream format registry
#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::schema::bitstream_formats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BitstreamFormat {
    pub id: i32,
    pub short_description: String,
    pub description: String,
    pub mime_type: String,
    pub support_level: FormatSupportLevel,
    /// Reserved for system use; submitters may not upload it
    pub internal: bool,
    pub extensions: Vec<String>,
}

impl BitstreamFormat {
    pub fn matches_extension(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(extension))
    }
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::bitstream_formats)]
pub struct NewBitstreamFormat {
    pub short_description: String,
    pub description: String,
    pub mime_type: String,
    pub support_level: FormatSupportLevel,
    pub internal: bool,
    pub extensions: Vec<String>,
}

impl NewBitstreamFormat {
    fn entry(
        short_description: &str,
        description: &str,
        mime_type: &str,
        support_level: FormatSupportLevel,
        internal: bool,
        extensions: &[&str],
    ) -> Self {
        Self {
            short_description: short_description.to_string(),
            description: description.to_string(),
            mime_type: mime_type.to_string(),
            support_level,
            internal,
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Registry contents shipped with a fresh repository, in id order.
    ///
    /// Mirrors the rows inserted by the initial migration.
    pub fn default_registry() -> Vec<Self> {
        use FormatSupportLevel::*;
        vec![
            Self::entry("Unknown", "Unknown data format", "application/octet-stream", Unknown, false, &[]),
            Self::entry("Adobe PDF", "Adobe Portable Document Format", "application/pdf", Supported, false, &["pdf"]),
            Self::entry("Text", "Plain Text", "text/plain", Known, false, &["txt"]),
            Self::entry("Microsoft Word", "Microsoft Word", "application/msword", Known, false, &["doc", "docx"]),
            Self::entry(
                "JPEG",
                "Joint Photographic Experts Group/JPEG File Interchange Format (JFIF)",
                "image/jpeg",
                Supported,
                false,
                &["jpg", "jpeg"],
            ),
            Self::entry("PNG", "Portable Network Graphics", "image/png", Known, false, &["png"]),
            Self::entry(
                "License",
                "Item-specific license agreed upon to submission",
                "text/plain; charset=utf-8",
                Supported,
                true,
                &["license"],
            ),
            Self::entry(
                "CC License",
                "Item-specific Creative Commons license agreed upon to submission",
                "text/html; charset=utf-8",
                Supported,
                true,
                &["cclicense"],
            ),
        ]
    }
}
