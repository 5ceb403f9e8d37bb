use diesel::prelude::*;
use jiff_diesel::Timestamp;

/// Bundle holding the files a submitter can see
pub const ORIGINAL_BUNDLE: &str = "ORIGINAL";

/// Bundle holding files kept out of public view
pub const PRESERVATION_BUNDLE: &str = "PRESERVATION";

/// Named group of bitstreams within an item
#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::schema::bundles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Bundle {
    pub id: i32,
    pub item_id: i32,
    pub name: String,
    pub primary_bitstream_id: Option<i32>,
    pub created_at: Timestamp,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::bundles)]
pub struct NewBundle {
    pub item_id: i32,
    pub name: String,
}
