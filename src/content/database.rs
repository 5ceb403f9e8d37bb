//! Postgres content store.
//!
//! Holds one pooled connection for the lifetime of a request. The first
//! statement opens a transaction; `commit` and `rollback` close it and the
//! next statement opens a fresh one.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AnsiTransactionManager, RunQueryDsl, TransactionManager};
use uuid::Uuid;

use crate::content::{AssetStore, ContentStore, NewContent};
use crate::db::{AsyncDbPool, OwnedDbConnection};
use crate::error::{AppError, AppResult};
use crate::models::{
    Bitstream, BitstreamFormat, Bundle, BundleBitstream, Item, NewBitstream, NewBundle, NewItem,
    NewWorkspaceItem, WorkspaceItem,
};

pub struct DatabaseContentStore {
    conn: OwnedDbConnection,
    assets: AssetStore,
    in_transaction: bool,
    /// Assets written since the last commit, discarded on rollback
    pending_assets: Vec<Uuid>,
}

impl DatabaseContentStore {
    /// Checks a connection out of the pool.
    pub async fn connect(pool: &AsyncDbPool, assets: AssetStore) -> AppResult<Self> {
        let conn = pool.get_owned().await?;
        Ok(Self {
            conn,
            assets,
            in_transaction: false,
            pending_assets: Vec::new(),
        })
    }

    async fn begin(&mut self) -> AppResult<&mut diesel_async::AsyncPgConnection> {
        if !self.in_transaction {
            AnsiTransactionManager::begin_transaction(&mut *self.conn).await?;
            self.in_transaction = true;
        }
        Ok(&mut *self.conn)
    }
}

#[async_trait]
impl ContentStore for DatabaseContentStore {
    async fn find_item(&mut self, item_id: i32) -> AppResult<Option<Item>> {
        use crate::schema::items::dsl::*;
        let conn = self.begin().await?;

        items
            .filter(id.eq(item_id))
            .select(Item::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn touch_item(&mut self, item_id: i32) -> AppResult<()> {
        use crate::schema::items::dsl::*;
        let conn = self.begin().await?;

        let updated = diesel::update(items.filter(id.eq(item_id)))
            .set(last_modified.eq(diesel::dsl::now))
            .execute(conn)
            .await?;
        if updated == 0 {
            return Err(AppError::not_found("item", item_id));
        }
        Ok(())
    }

    async fn item_bundles(&mut self, owner: i32) -> AppResult<Vec<Bundle>> {
        use crate::schema::bundles::dsl::*;
        let conn = self.begin().await?;

        bundles
            .filter(item_id.eq(owner))
            .order(id.asc())
            .select(Bundle::as_select())
            .load(conn)
            .await
            .map_err(AppError::from)
    }

    async fn create_bundle(&mut self, owner: i32, bundle_name: &str) -> AppResult<Bundle> {
        use crate::schema::bundles::dsl::*;
        let conn = self.begin().await?;

        diesel::insert_into(bundles)
            .values(&NewBundle {
                item_id: owner,
                name: bundle_name.to_string(),
            })
            .returning(Bundle::as_returning())
            .get_result(conn)
            .await
            .map_err(AppError::from)
    }

    async fn remove_bundle(&mut self, owner: i32, target: i32) -> AppResult<()> {
        use crate::schema::{bundle_bitstreams, bundles};
        let conn = self.begin().await?;

        diesel::delete(bundle_bitstreams::table.filter(bundle_bitstreams::bundle_id.eq(target)))
            .execute(conn)
            .await?;
        let removed = diesel::delete(
            bundles::table
                .filter(bundles::id.eq(target))
                .filter(bundles::item_id.eq(owner)),
        )
        .execute(conn)
        .await?;

        if removed == 0 {
            return Err(AppError::not_found("bundle", target));
        }
        Ok(())
    }

    async fn bundle_bitstreams(&mut self, target: i32) -> AppResult<Vec<Bitstream>> {
        use crate::schema::{bitstreams, bundle_bitstreams};
        let conn = self.begin().await?;

        bitstreams::table
            .inner_join(bundle_bitstreams::table)
            .filter(bundle_bitstreams::bundle_id.eq(target))
            .filter(bitstreams::deleted.eq(false))
            .order(bitstreams::id.asc())
            .select(Bitstream::as_select())
            .load(conn)
            .await
            .map_err(AppError::from)
    }

    async fn create_bitstream(
        &mut self,
        target: i32,
        content: NewContent<'_>,
    ) -> AppResult<Bitstream> {
        use crate::schema::{bitstreams, bundle_bitstreams};

        let internal_id = self.assets.store(content.bytes).await?;
        self.pending_assets.push(internal_id);

        let conn = self.begin().await?;
        let bitstream = diesel::insert_into(bitstreams::table)
            .values(&NewBitstream {
                name: content.name.to_string(),
                source: content.source.to_string(),
                description: content.description.map(str::to_string),
                format_id: None,
                size_bytes: content.bytes.len() as i64,
                internal_id,
            })
            .returning(Bitstream::as_returning())
            .get_result(conn)
            .await?;

        diesel::insert_into(bundle_bitstreams::table)
            .values(&BundleBitstream {
                bundle_id: target,
                bitstream_id: bitstream.id,
            })
            .execute(conn)
            .await?;

        Ok(bitstream)
    }

    async fn find_bitstream(&mut self, bitstream_id: i32) -> AppResult<Option<Bitstream>> {
        use crate::schema::bitstreams::dsl::*;
        let conn = self.begin().await?;

        bitstreams
            .filter(id.eq(bitstream_id))
            .filter(deleted.eq(false))
            .select(Bitstream::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn update_bitstream(&mut self, bitstream: &Bitstream) -> AppResult<()> {
        use crate::schema::bitstreams::dsl::*;
        let conn = self.begin().await?;

        diesel::update(bitstreams.filter(id.eq(bitstream.id)))
            .set((
                name.eq(&bitstream.name),
                source.eq(&bitstream.source),
                description.eq(&bitstream.description),
                user_format_description.eq(&bitstream.user_format_description),
                format_id.eq(bitstream.format_id),
            ))
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn remove_bitstream(&mut self, target_bundle: i32, target: i32) -> AppResult<()> {
        use crate::schema::{bitstreams, bundle_bitstreams};
        let conn = self.begin().await?;

        let unlinked = diesel::delete(
            bundle_bitstreams::table
                .filter(bundle_bitstreams::bundle_id.eq(target_bundle))
                .filter(bundle_bitstreams::bitstream_id.eq(target)),
        )
        .execute(conn)
        .await?;
        if unlinked == 0 {
            return Err(AppError::not_found("bundle bitstream", target));
        }

        let remaining: i64 = bundle_bitstreams::table
            .filter(bundle_bitstreams::bitstream_id.eq(target))
            .count()
            .get_result(conn)
            .await?;
        if remaining == 0 {
            diesel::update(bitstreams::table.filter(bitstreams::id.eq(target)))
                .set(bitstreams::deleted.eq(true))
                .execute(conn)
                .await?;
        }
        Ok(())
    }

    async fn bitstream_bundles(&mut self, target: i32) -> AppResult<Vec<Bundle>> {
        use crate::schema::{bundle_bitstreams, bundles};
        let conn = self.begin().await?;

        bundles::table
            .inner_join(bundle_bitstreams::table)
            .filter(bundle_bitstreams::bitstream_id.eq(target))
            .order(bundles::id.asc())
            .select(Bundle::as_select())
            .load(conn)
            .await
            .map_err(AppError::from)
    }

    async fn set_primary_bitstream(
        &mut self,
        target: i32,
        bitstream_id: Option<i32>,
    ) -> AppResult<()> {
        use crate::schema::bundles::dsl::*;
        let conn = self.begin().await?;

        diesel::update(bundles.filter(id.eq(target)))
            .set(primary_bitstream_id.eq(bitstream_id))
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn item_bitstreams(&mut self, owner: i32) -> AppResult<Vec<Bitstream>> {
        use crate::schema::{bitstreams, bundle_bitstreams, bundles};
        let conn = self.begin().await?;

        bitstreams::table
            .inner_join(bundle_bitstreams::table.inner_join(bundles::table))
            .filter(bundles::item_id.eq(owner))
            .filter(bitstreams::deleted.eq(false))
            .select(Bitstream::as_select())
            .distinct()
            .order(bitstreams::id.asc())
            .load(conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_format(&mut self, format_id: i32) -> AppResult<Option<BitstreamFormat>> {
        use crate::schema::bitstream_formats::dsl::*;
        let conn = self.begin().await?;

        bitstream_formats
            .filter(id.eq(format_id))
            .select(BitstreamFormat::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn find_format_by_extension(
        &mut self,
        extension: &str,
    ) -> AppResult<Option<BitstreamFormat>> {
        use crate::schema::bitstream_formats::dsl::*;
        let conn = self.begin().await?;

        bitstream_formats
            .filter(extensions.contains(vec![extension.to_ascii_lowercase()]))
            .order(id.asc())
            .select(BitstreamFormat::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn list_formats(&mut self) -> AppResult<Vec<BitstreamFormat>> {
        use crate::schema::bitstream_formats::dsl::*;
        let conn = self.begin().await?;

        bitstream_formats
            .order(id.asc())
            .select(BitstreamFormat::as_select())
            .load(conn)
            .await
            .map_err(AppError::from)
    }

    async fn create_workspace_item(&mut self, title: &str) -> AppResult<WorkspaceItem> {
        use crate::schema::{items, workspace_items};
        let conn = self.begin().await?;

        let item = diesel::insert_into(items::table)
            .values(&NewItem {
                title: title.to_string(),
            })
            .returning(Item::as_returning())
            .get_result(conn)
            .await?;

        diesel::insert_into(workspace_items::table)
            .values(&NewWorkspaceItem { item_id: item.id })
            .returning(WorkspaceItem::as_returning())
            .get_result(conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_workspace_item(&mut self, target: i32) -> AppResult<Option<WorkspaceItem>> {
        use crate::schema::workspace_items::dsl::*;
        let conn = self.begin().await?;

        workspace_items
            .filter(id.eq(target))
            .select(WorkspaceItem::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn commit(&mut self) -> AppResult<()> {
        if self.in_transaction {
            self.in_transaction = false;
            AnsiTransactionManager::commit_transaction(&mut *self.conn).await?;
        }
        self.pending_assets.clear();
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        if self.in_transaction {
            self.in_transaction = false;
            AnsiTransactionManager::rollback_transaction(&mut *self.conn).await?;
        }
        for internal_id in std::mem::take(&mut self.pending_assets) {
            self.assets.discard(internal_id).await?;
        }
        Ok(())
    }
}
