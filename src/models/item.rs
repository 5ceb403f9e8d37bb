use diesel::prelude::*;
use jiff_diesel::Timestamp;

/// Archival unit that owns bundles of bitstreams
#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::schema::items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Item {
    pub id: i32,
    pub title: String,
    pub in_archive: bool,
    pub last_modified: Timestamp,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::items)]
pub struct NewItem {
    pub title: String,
}
