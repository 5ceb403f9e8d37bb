use diesel::prelude::*;
use jiff_diesel::Timestamp;

/// A submission in progress, wrapping exactly one item
#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::schema::workspace_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkspaceItem {
    pub id: i32,
    pub item_id: i32,
    pub stage_reached: i32,
    pub created_at: Timestamp,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::workspace_items)]
pub struct NewWorkspaceItem {
    pub item_id: i32,
}
