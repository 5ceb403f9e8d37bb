//! Submission service.
//!
//! Opens one [`ContentStore`] unit of work per call, runs the upload step
//! or the read it was asked for, and commits on success or rolls back on
//! error.

use crate::content::{ContentBackend, ContentStore};
use crate::error::{AppError, AppResult};
use crate::models::{Bitstream, BitstreamFormat, Bundle, Item, WorkspaceItem};
use crate::submit::{StepRequest, StepStatus, SubmissionInfo, UploadStep, find_item_bitstream};

/// A bundle with its files and their formats.
#[derive(Debug, Clone)]
pub struct BundleView {
    pub bundle: Bundle,
    pub files: Vec<(Bitstream, Option<BitstreamFormat>)>,
}

/// Current state of a submission's upload step.
#[derive(Debug, Clone)]
pub struct SubmissionView {
    pub workspace_item: WorkspaceItem,
    pub item: Item,
    pub bundles: Vec<BundleView>,
    pub editing_bitstream: Option<i32>,
    pub needed_files: Vec<String>,
    pub required_files: String,
}

/// Result of one pass through the upload step.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub status: StepStatus,
    pub editing_bitstream: Option<i32>,
    pub needed_files: Vec<String>,
    pub required_files: String,
}

#[derive(Clone)]
pub struct SubmissionService {
    content: ContentBackend,
    step: UploadStep,
}

impl SubmissionService {
    pub fn new(content: ContentBackend, step: UploadStep) -> Self {
        Self { content, step }
    }

    pub fn step(&self) -> &UploadStep {
        &self.step
    }

    /// Creates an item titled `title` and the submission wrapping it.
    pub async fn create(&self, title: &str) -> AppResult<WorkspaceItem> {
        let mut store = self.content.open().await?;
        let result = store.create_workspace_item(title).await;
        let workspace_item = finish(store.as_mut(), result).await?;
        tracing::info!(
            submission_id = workspace_item.id,
            item_id = workspace_item.item_id,
            "Created submission"
        );
        Ok(workspace_item)
    }

    /// Loads a submission with its files.
    ///
    /// `editing` is the bitstream the caller's session is editing. It is
    /// reported only while it still belongs to the item.
    pub async fn get(&self, id: i32, editing: Option<i32>) -> AppResult<SubmissionView> {
        let mut store = self.content.open().await?;
        let result = self.load(store.as_mut(), id, editing).await;
        finish(store.as_mut(), result).await
    }

    async fn load(
        &self,
        store: &mut dyn ContentStore,
        id: i32,
        editing: Option<i32>,
    ) -> AppResult<SubmissionView> {
        let workspace_item = find_submission(store, id).await?;
        let item = store
            .find_item(workspace_item.item_id)
            .await?
            .ok_or_else(|| AppError::not_found("item", workspace_item.item_id))?;

        let mut bundles = Vec::new();
        for bundle in store.item_bundles(item.id).await? {
            let mut files = Vec::new();
            for bitstream in store.bundle_bitstreams(bundle.id).await? {
                let format = match bitstream.format_id {
                    Some(format_id) => store.find_format(format_id).await?,
                    None => None,
                };
                files.push((bitstream, format));
            }
            bundles.push(BundleView { bundle, files });
        }

        let editing_bitstream = match editing {
            Some(bitstream_id) => find_item_bitstream(store, item.id, bitstream_id)
                .await?
                .map(|b| b.id),
            None => None,
        };
        let needed_files = self.step.needed_bitstreams(store, item.id).await?;

        Ok(SubmissionView {
            workspace_item,
            item,
            bundles,
            editing_bitstream,
            needed_files,
            required_files: self.step.list_needed_bitstreams(),
        })
    }

    /// Runs the upload step for submission `id`.
    ///
    /// Step outcomes, failures included, come back in [`UploadOutcome`].
    /// Only store faults and an unknown submission are errors.
    pub async fn process_upload(
        &self,
        id: i32,
        request: &StepRequest,
        editing: Option<i32>,
    ) -> AppResult<UploadOutcome> {
        let mut store = self.content.open().await?;
        let result = self.upload(store.as_mut(), id, request, editing).await;
        finish(store.as_mut(), result).await
    }

    async fn upload(
        &self,
        store: &mut dyn ContentStore,
        id: i32,
        request: &StepRequest,
        editing: Option<i32>,
    ) -> AppResult<UploadOutcome> {
        let workspace_item = find_submission(store, id).await?;
        let mut info = SubmissionInfo::new(workspace_item.id, workspace_item.item_id);
        info.editing_bitstream = editing;

        let status = self.step.process(store, request, &mut info).await?;
        let needed_files = self.step.needed_bitstreams(store, info.item_id).await?;

        tracing::info!(
            submission_id = id,
            status = status.code(),
            editing = ?info.editing_bitstream,
            "Upload step processed"
        );

        Ok(UploadOutcome {
            status,
            editing_bitstream: info.editing_bitstream,
            needed_files,
            required_files: self.step.list_needed_bitstreams(),
        })
    }

    pub async fn list_formats(&self) -> AppResult<Vec<BitstreamFormat>> {
        let mut store = self.content.open().await?;
        let result = store.list_formats().await;
        finish(store.as_mut(), result).await
    }
}

async fn find_submission(store: &mut dyn ContentStore, id: i32) -> AppResult<WorkspaceItem> {
    store
        .find_workspace_item(id)
        .await?
        .ok_or_else(|| AppError::not_found("workspace_item", id))
}

/// Commits after a successful operation and rolls back after a failed one.
async fn finish<T>(store: &mut dyn ContentStore, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            store.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = store.rollback().await {
                tracing::error!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryContentStore;
    use crate::submit::Attribute;

    fn service() -> (SubmissionService, MemoryContentStore) {
        let store = MemoryContentStore::new();
        let service = SubmissionService::new(
            ContentBackend::Memory(store.clone()),
            UploadStep::default(),
        );
        (service, store)
    }

    fn upload(field: &str, path: &str, description: &str) -> StepRequest {
        StepRequest::multipart()
            .with_param("submit_upload", "Upload")
            .with_attribute(format!("{field}-path"), Attribute::Text(path.to_string()))
            .with_attribute(format!("{field}-inputstream"), Attribute::Bytes(b"%PDF-1.4".to_vec()))
            .with_attribute(format!("{field}-description"), Attribute::Text(description.to_string()))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (service, _) = service();
        let ws = service.create("Award").await.unwrap();

        let view = service.get(ws.id, None).await.unwrap();
        assert_eq!(view.item.title, "Award");
        assert!(view.bundles.is_empty());
        assert_eq!(view.needed_files, service.step().policy().required_files);
        assert_eq!(view.required_files, service.step().list_needed_bitstreams());
    }

    #[tokio::test]
    async fn test_unknown_submission_is_not_found() {
        let (service, store) = service();
        let err = service.get(404, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        let err = service
            .process_upload(404, &StepRequest::form(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(store.rollback_count().await, 2);
    }

    #[tokio::test]
    async fn test_upload_reports_missing_categories() {
        let (service, _) = service();
        let ws = service.create("Award").await.unwrap();

        let outcome = service
            .process_upload(ws.id, &upload("file", "essay.pdf", "Essay"), None)
            .await
            .unwrap();
        assert_eq!(outcome.status, StepStatus::MissingBitstreams);
        assert!(outcome.editing_bitstream.is_some());
        assert!(!outcome.needed_files.contains(&"Essay".to_string()));

        let view = service.get(ws.id, outcome.editing_bitstream).await.unwrap();
        assert_eq!(view.bundles.len(), 1);
        assert_eq!(view.bundles[0].files.len(), 1);
        assert_eq!(view.editing_bitstream, outcome.editing_bitstream);
        let (file, format) = &view.bundles[0].files[0];
        assert_eq!(file.name, "essay.pdf");
        assert_eq!(format.as_ref().unwrap().mime_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_foreign_editing_bitstream_is_hidden() {
        let (service, _) = service();
        let mine = service.create("Mine").await.unwrap();
        let theirs = service.create("Theirs").await.unwrap();
        let outcome = service
            .process_upload(theirs.id, &upload("file", "essay.pdf", "Essay"), None)
            .await
            .unwrap();

        let view = service.get(mine.id, outcome.editing_bitstream).await.unwrap();
        assert_eq!(view.editing_bitstream, None);
    }

    #[tokio::test]
    async fn test_list_formats() {
        let (service, _) = service();
        let formats = service.list_formats().await.unwrap();
        assert_eq!(formats.len(), 8);
        assert!(formats.iter().any(|f| f.internal));
    }
}
