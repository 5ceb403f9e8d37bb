//! Process-local content store.
//!
//! Writes apply immediately and are shared by every clone. `commit` and
//! `rollback` only count calls, so there is no isolation between requests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use jiff_diesel::ToDiesel;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::content::{ContentStore, NewContent};
use crate::error::{AppError, AppResult};
use crate::models::{
    Bitstream, BitstreamFormat, Bundle, BundleBitstream, Item, NewBitstreamFormat, WorkspaceItem,
};

#[derive(Default)]
struct Sequences {
    item: i32,
    workspace_item: i32,
    bundle: i32,
    bitstream: i32,
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

#[derive(Default)]
struct MemoryState {
    items: BTreeMap<i32, Item>,
    workspace_items: BTreeMap<i32, WorkspaceItem>,
    bundles: BTreeMap<i32, Bundle>,
    bitstreams: BTreeMap<i32, Bitstream>,
    contents: HashMap<Uuid, Vec<u8>>,
    links: Vec<BundleBitstream>,
    formats: Vec<BitstreamFormat>,
    sequences: Sequences,
    commits: usize,
    rollbacks: usize,
}

impl MemoryState {
    fn live_bitstreams_of(&self, bundle_id: i32) -> Vec<Bitstream> {
        let mut ids: Vec<i32> = self
            .links
            .iter()
            .filter(|l| l.bundle_id == bundle_id)
            .map(|l| l.bitstream_id)
            .collect();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| self.bitstreams.get(&id))
            .filter(|b| !b.deleted)
            .cloned()
            .collect()
    }
}

/// In-memory [`ContentStore`] seeded with the default format registry
#[derive(Clone)]
pub struct MemoryContentStore {
    state: Arc<Mutex<MemoryState>>,
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContentStore {
    pub fn new() -> Self {
        let formats = NewBitstreamFormat::default_registry()
            .into_iter()
            .zip(1..)
            .map(|(f, id)| BitstreamFormat {
                id,
                short_description: f.short_description,
                description: f.description,
                mime_type: f.mime_type,
                support_level: f.support_level,
                internal: f.internal,
                extensions: f.extensions,
            })
            .collect();

        Self {
            state: Arc::new(Mutex::new(MemoryState {
                formats,
                ..MemoryState::default()
            })),
        }
    }

    /// Number of successful `commit` calls across all clones.
    pub async fn commit_count(&self) -> usize {
        self.state.lock().await.commits
    }

    pub async fn rollback_count(&self) -> usize {
        self.state.lock().await.rollbacks
    }

    /// Raw content of a bitstream, deleted or not.
    pub async fn content(&self, internal_id: Uuid) -> Option<Vec<u8>> {
        self.state.lock().await.contents.get(&internal_id).cloned()
    }

    /// Bitstream by id, including deleted ones.
    pub async fn raw_bitstream(&self, bitstream_id: i32) -> Option<Bitstream> {
        self.state.lock().await.bitstreams.get(&bitstream_id).cloned()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn find_item(&mut self, item_id: i32) -> AppResult<Option<Item>> {
        Ok(self.state.lock().await.items.get(&item_id).cloned())
    }

    async fn touch_item(&mut self, item_id: i32) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let item = state
            .items
            .get_mut(&item_id)
            .ok_or_else(|| AppError::not_found("item", item_id))?;
        item.last_modified = jiff::Timestamp::now().to_diesel();
        Ok(())
    }

    async fn item_bundles(&mut self, item_id: i32) -> AppResult<Vec<Bundle>> {
        Ok(self
            .state
            .lock()
            .await
            .bundles
            .values()
            .filter(|b| b.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn create_bundle(&mut self, item_id: i32, name: &str) -> AppResult<Bundle> {
        let mut state = self.state.lock().await;
        if !state.items.contains_key(&item_id) {
            return Err(AppError::not_found("item", item_id));
        }
        let bundle = Bundle {
            id: next(&mut state.sequences.bundle),
            item_id,
            name: name.to_string(),
            primary_bitstream_id: None,
            created_at: jiff::Timestamp::now().to_diesel(),
        };
        state.bundles.insert(bundle.id, bundle.clone());
        Ok(bundle)
    }

    async fn remove_bundle(&mut self, item_id: i32, bundle_id: i32) -> AppResult<()> {
        let mut state = self.state.lock().await;
        match state.bundles.get(&bundle_id) {
            Some(bundle) if bundle.item_id == item_id => {
                state.bundles.remove(&bundle_id);
                state.links.retain(|l| l.bundle_id != bundle_id);
                Ok(())
            }
            _ => Err(AppError::not_found("bundle", bundle_id)),
        }
    }

    async fn bundle_bitstreams(&mut self, bundle_id: i32) -> AppResult<Vec<Bitstream>> {
        Ok(self.state.lock().await.live_bitstreams_of(bundle_id))
    }

    async fn create_bitstream(
        &mut self,
        bundle_id: i32,
        content: NewContent<'_>,
    ) -> AppResult<Bitstream> {
        let mut state = self.state.lock().await;
        if !state.bundles.contains_key(&bundle_id) {
            return Err(AppError::not_found("bundle", bundle_id));
        }

        let internal_id = Uuid::new_v4();
        let bitstream = Bitstream {
            id: next(&mut state.sequences.bitstream),
            name: content.name.to_string(),
            source: content.source.to_string(),
            description: content.description.map(str::to_string),
            user_format_description: None,
            format_id: None,
            size_bytes: content.bytes.len() as i64,
            internal_id,
            deleted: false,
            created_at: jiff::Timestamp::now().to_diesel(),
        };

        state.contents.insert(internal_id, content.bytes.to_vec());
        state.bitstreams.insert(bitstream.id, bitstream.clone());
        state.links.push(BundleBitstream {
            bundle_id,
            bitstream_id: bitstream.id,
        });
        Ok(bitstream)
    }

    async fn find_bitstream(&mut self, bitstream_id: i32) -> AppResult<Option<Bitstream>> {
        Ok(self
            .state
            .lock()
            .await
            .bitstreams
            .get(&bitstream_id)
            .filter(|b| !b.deleted)
            .cloned())
    }

    async fn update_bitstream(&mut self, bitstream: &Bitstream) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let stored = state
            .bitstreams
            .get_mut(&bitstream.id)
            .ok_or_else(|| AppError::not_found("bitstream", bitstream.id))?;
        stored.name = bitstream.name.clone();
        stored.source = bitstream.source.clone();
        stored.description = bitstream.description.clone();
        stored.user_format_description = bitstream.user_format_description.clone();
        stored.format_id = bitstream.format_id;
        Ok(())
    }

    async fn remove_bitstream(&mut self, bundle_id: i32, bitstream_id: i32) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let link = BundleBitstream {
            bundle_id,
            bitstream_id,
        };
        let before = state.links.len();
        state.links.retain(|l| *l != link);
        if state.links.len() == before {
            return Err(AppError::not_found("bundle bitstream", bitstream_id));
        }

        if !state.links.iter().any(|l| l.bitstream_id == bitstream_id)
            && let Some(bitstream) = state.bitstreams.get_mut(&bitstream_id)
        {
            bitstream.deleted = true;
        }
        Ok(())
    }

    async fn bitstream_bundles(&mut self, bitstream_id: i32) -> AppResult<Vec<Bundle>> {
        let state = self.state.lock().await;
        let mut bundles: Vec<Bundle> = state
            .links
            .iter()
            .filter(|l| l.bitstream_id == bitstream_id)
            .filter_map(|l| state.bundles.get(&l.bundle_id))
            .cloned()
            .collect();
        bundles.sort_by_key(|b| b.id);
        Ok(bundles)
    }

    async fn set_primary_bitstream(
        &mut self,
        bundle_id: i32,
        bitstream_id: Option<i32>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let bundle = state
            .bundles
            .get_mut(&bundle_id)
            .ok_or_else(|| AppError::not_found("bundle", bundle_id))?;
        bundle.primary_bitstream_id = bitstream_id;
        Ok(())
    }

    async fn item_bitstreams(&mut self, item_id: i32) -> AppResult<Vec<Bitstream>> {
        let state = self.state.lock().await;
        let mut result: Vec<Bitstream> = state
            .bundles
            .values()
            .filter(|b| b.item_id == item_id)
            .flat_map(|b| state.live_bitstreams_of(b.id))
            .collect();
        result.sort_by_key(|b| b.id);
        result.dedup_by_key(|b| b.id);
        Ok(result)
    }

    async fn find_format(&mut self, format_id: i32) -> AppResult<Option<BitstreamFormat>> {
        Ok(self
            .state
            .lock()
            .await
            .formats
            .iter()
            .find(|f| f.id == format_id)
            .cloned())
    }

    async fn find_format_by_extension(
        &mut self,
        extension: &str,
    ) -> AppResult<Option<BitstreamFormat>> {
        Ok(self
            .state
            .lock()
            .await
            .formats
            .iter()
            .find(|f| f.matches_extension(extension))
            .cloned())
    }

    async fn list_formats(&mut self) -> AppResult<Vec<BitstreamFormat>> {
        Ok(self.state.lock().await.formats.clone())
    }

    async fn create_workspace_item(&mut self, title: &str) -> AppResult<WorkspaceItem> {
        let mut state = self.state.lock().await;
        let now = jiff::Timestamp::now().to_diesel();

        let item = Item {
            id: next(&mut state.sequences.item),
            title: title.to_string(),
            in_archive: false,
            last_modified: now,
        };
        let workspace_item = WorkspaceItem {
            id: next(&mut state.sequences.workspace_item),
            item_id: item.id,
            stage_reached: 0,
            created_at: now,
        };

        state.items.insert(item.id, item);
        state
            .workspace_items
            .insert(workspace_item.id, workspace_item.clone());
        Ok(workspace_item)
    }

    async fn find_workspace_item(&mut self, id: i32) -> AppResult<Option<WorkspaceItem>> {
        Ok(self.state.lock().await.workspace_items.get(&id).cloned())
    }

    async fn commit(&mut self) -> AppResult<()> {
        self.state.lock().await.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        self.state.lock().await.rollbacks += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ORIGINAL_BUNDLE;

    fn content<'a>(name: &'a str, bytes: &'a [u8]) -> NewContent<'a> {
        NewContent {
            name,
            source: name,
            description: None,
            bytes,
        }
    }

    #[tokio::test]
    async fn test_seeded_registry() {
        let mut store = MemoryContentStore::new();
        let formats = store.list_formats().await.unwrap();
        assert_eq!(formats.len(), 8);
        assert_eq!(formats[0].short_description, "Unknown");
        assert_eq!(formats[1].mime_type, "application/pdf");
        assert_eq!(formats.iter().filter(|f| f.internal).count(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let mut store = MemoryContentStore::new();
        let mut other = store.clone();

        let ws = store.create_workspace_item("Thesis").await.unwrap();
        assert!(other.find_item(ws.item_id).await.unwrap().is_some());

        other.commit().await.unwrap();
        assert_eq!(store.commit_count().await, 1);
    }

    #[tokio::test]
    async fn test_remove_flags_deleted_and_keeps_content() {
        let mut store = MemoryContentStore::new();
        let ws = store.create_workspace_item("Thesis").await.unwrap();
        let bundle = store.create_bundle(ws.item_id, ORIGINAL_BUNDLE).await.unwrap();
        let b = store
            .create_bitstream(bundle.id, content("a.pdf", b"pdf"))
            .await
            .unwrap();

        assert!(store.has_uploaded_files(ws.item_id).await.unwrap());
        store.remove_bitstream(bundle.id, b.id).await.unwrap();

        assert!(store.find_bitstream(b.id).await.unwrap().is_none());
        assert!(store.raw_bitstream(b.id).await.unwrap().deleted);
        assert_eq!(store.content(b.internal_id).await.unwrap(), b"pdf");
        assert!(!store.has_uploaded_files(ws.item_id).await.unwrap());

        assert!(store.remove_bitstream(bundle.id, b.id).await.is_err());
    }

    #[tokio::test]
    async fn test_non_internal_bitstreams_skip_internal_formats() {
        let mut store = MemoryContentStore::new();
        let ws = store.create_workspace_item("Thesis").await.unwrap();
        let bundle = store.create_bundle(ws.item_id, ORIGINAL_BUNDLE).await.unwrap();

        let mut license = store
            .create_bitstream(bundle.id, content("deposit.license", b"terms"))
            .await
            .unwrap();
        license.set_format(7);
        store.update_bitstream(&license).await.unwrap();
        let unknown = store
            .create_bitstream(bundle.id, content("notes.xyz", b"?"))
            .await
            .unwrap();

        let visible = store.non_internal_bitstreams(ws.item_id).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].0.id, unknown.id);
        assert!(visible[0].1.is_none());
    }

    #[tokio::test]
    async fn test_bundle_requires_item() {
        let mut store = MemoryContentStore::new();
        assert!(matches!(
            store.create_bundle(99, ORIGINAL_BUNDLE).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
