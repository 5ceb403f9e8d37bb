use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

/// Stored file plus its metadata.
///
/// Content lives in the asset store under `internal_id`. A bitstream with no
/// `format_id` is of unknown format.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::bitstreams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Bitstream {
    pub id: i32,
    pub name: String,
    pub source: String,
    pub description: Option<String>,
    pub user_format_description: Option<String>,
    pub format_id: Option<i32>,
    pub size_bytes: i64,
    pub internal_id: Uuid,
    pub deleted: bool,
    pub created_at: Timestamp,
}

impl Bitstream {
    /// Sets a registry format, dropping any free-text description.
    pub fn set_format(&mut self, format_id: i32) {
        self.format_id = Some(format_id);
        self.user_format_description = None;
    }

    /// Records a submitter-supplied format; the registry format becomes unknown.
    pub fn set_user_format_description(&mut self, description: Option<String>) {
        self.format_id = None;
        self.user_format_description = description;
    }
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::bitstreams)]
pub struct NewBitstream {
    pub name: String,
    pub source: String,
    pub description: Option<String>,
    pub format_id: Option<i32>,
    pub size_bytes: i64,
    pub internal_id: Uuid,
}

/// Bundle membership row
#[derive(Debug, Queryable, Selectable, Insertable, Clone, Copy, PartialEq, Eq)]
#[diesel(table_name = crate::schema::bundle_bitstreams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BundleBitstream {
    pub bundle_id: i32,
    pub bitstream_id: i32,
}
