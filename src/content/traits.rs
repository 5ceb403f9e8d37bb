use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Bitstream, BitstreamFormat, Bundle, Item, WorkspaceItem};

/// Content and metadata for a bitstream about to be stored
#[derive(Debug, Clone, Copy)]
pub struct NewContent<'a> {
    /// File name without directory components
    pub name: &'a str,
    /// Path as supplied by the client
    pub source: &'a str,
    pub description: Option<&'a str>,
    pub bytes: &'a [u8],
}

/// Unit of work over the content repository.
///
/// One value serves one request. Writes become durable on [`commit`] and
/// are discarded by [`rollback`]; both leave the store usable for further
/// operations.
///
/// [`commit`]: ContentStore::commit
/// [`rollback`]: ContentStore::rollback
#[async_trait]
pub trait ContentStore: Send {
    async fn find_item(&mut self, item_id: i32) -> AppResult<Option<Item>>;

    /// Bumps the item's last-modified time.
    async fn touch_item(&mut self, item_id: i32) -> AppResult<()>;

    /// Bundles of an item in creation order.
    async fn item_bundles(&mut self, item_id: i32) -> AppResult<Vec<Bundle>>;

    async fn create_bundle(&mut self, item_id: i32, name: &str) -> AppResult<Bundle>;

    /// Detaches and deletes a bundle. Its bitstreams must already be gone.
    async fn remove_bundle(&mut self, item_id: i32, bundle_id: i32) -> AppResult<()>;

    /// Live bitstreams of a bundle in id order.
    async fn bundle_bitstreams(&mut self, bundle_id: i32) -> AppResult<Vec<Bitstream>>;

    async fn create_bitstream(
        &mut self,
        bundle_id: i32,
        content: NewContent<'_>,
    ) -> AppResult<Bitstream>;

    /// Finds a bitstream that has not been deleted.
    async fn find_bitstream(&mut self, bitstream_id: i32) -> AppResult<Option<Bitstream>>;

    /// Persists name, source, description and format fields.
    async fn update_bitstream(&mut self, bitstream: &Bitstream) -> AppResult<()>;

    /// Unlinks a bitstream from a bundle and flags it deleted when no bundle
    /// references it any more.
    async fn remove_bitstream(&mut self, bundle_id: i32, bitstream_id: i32) -> AppResult<()>;

    /// Bundles containing the bitstream, in bundle id order.
    async fn bitstream_bundles(&mut self, bitstream_id: i32) -> AppResult<Vec<Bundle>>;

    async fn set_primary_bitstream(
        &mut self,
        bundle_id: i32,
        bitstream_id: Option<i32>,
    ) -> AppResult<()>;

    /// Every live bitstream in any bundle of the item, without duplicates.
    async fn item_bitstreams(&mut self, item_id: i32) -> AppResult<Vec<Bitstream>>;

    async fn find_format(&mut self, format_id: i32) -> AppResult<Option<BitstreamFormat>>;

    /// Lowest-id format registered for the extension (case-insensitive).
    async fn find_format_by_extension(
        &mut self,
        extension: &str,
    ) -> AppResult<Option<BitstreamFormat>>;

    async fn list_formats(&mut self) -> AppResult<Vec<BitstreamFormat>>;

    /// Creates an item with the given title and the submission wrapping it.
    async fn create_workspace_item(&mut self, title: &str) -> AppResult<WorkspaceItem>;

    async fn find_workspace_item(&mut self, id: i32) -> AppResult<Option<WorkspaceItem>>;

    async fn commit(&mut self) -> AppResult<()>;

    async fn rollback(&mut self) -> AppResult<()>;

    /// Bundles of the item carrying `name`.
    async fn bundles_by_name(&mut self, item_id: i32, name: &str) -> AppResult<Vec<Bundle>> {
        Ok(self
            .item_bundles(item_id)
            .await?
            .into_iter()
            .filter(|b| b.name == name)
            .collect())
    }

    /// True when any bundle of the item holds a live bitstream.
    async fn has_uploaded_files(&mut self, item_id: i32) -> AppResult<bool> {
        Ok(!self.item_bitstreams(item_id).await?.is_empty())
    }

    /// Bitstreams whose format is not reserved for system use, paired with
    /// that format. Bitstreams of unknown format are included.
    async fn non_internal_bitstreams(
        &mut self,
        item_id: i32,
    ) -> AppResult<Vec<(Bitstream, Option<BitstreamFormat>)>> {
        let mut result = Vec::new();
        for bitstream in self.item_bitstreams(item_id).await? {
            let format = match bitstream.format_id {
                Some(format_id) => self.find_format(format_id).await?,
                None => None,
            };
            if !format.as_ref().is_some_and(|f| f.internal) {
                result.push((bitstream, format));
            }
        }
        Ok(result)
    }
}
