use crate::content::ContentStore;
use crate::error::AppResult;
use crate::models::{Bitstream, ORIGINAL_BUNDLE};
use crate::submit::checks::{self, find_item_bitstream, parse_id};
use crate::submit::ingest;
use crate::submit::request::PROGRESS_BAR_PREFIX;
use crate::submit::{StepRequest, StepStatus, SubmissionInfo, UploadPolicy};

pub const CANCEL_EDIT_BUTTON: &str = "submit_edit_cancel";
pub const EDIT_PREFIX: &str = "submit_edit_";
pub const REMOVE_SELECTED_BUTTON: &str = "submit_remove_selected";
pub const REMOVE_PREFIX: &str = "submit_remove_";
pub const UPLOAD_BUTTON: &str = "submit_upload";
pub const SKIP_BUTTON: &str = "submit_skip";
pub const MORE_BUTTON: &str = "submit_more";

/// Stages of [`UploadStep::process`], in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Ingest,
    ProgressJump,
    EditSelection,
    RemoveSelected,
    RemoveSingle,
    Description,
    Format,
    PrimaryBitstream,
    RequireFiles,
    CommitFiles,
    RequiredCategories,
    PdfOnly,
    Finish,
}

const STAGES: [Stage; 13] = [
    Stage::Ingest,
    Stage::ProgressJump,
    Stage::EditSelection,
    Stage::RemoveSelected,
    Stage::RemoveSingle,
    Stage::Description,
    Stage::Format,
    Stage::PrimaryBitstream,
    Stage::RequireFiles,
    Stage::CommitFiles,
    Stage::RequiredCategories,
    Stage::PdfOnly,
    Stage::Finish,
];

enum Flow {
    Continue,
    Return(StepStatus),
}

impl From<StepStatus> for Flow {
    /// `Complete` continues; anything else stops processing.
    fn from(status: StepStatus) -> Self {
        if status.is_success() {
            Flow::Continue
        } else {
            Flow::Return(status)
        }
    }
}

/// Upload step of a library award submission.
#[derive(Debug, Clone, Default)]
pub struct UploadStep {
    policy: UploadPolicy,
}

impl UploadStep {
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// The step occupies a single page of the progress bar.
    pub fn number_of_pages(&self) -> u32 {
        1
    }

    /// Handles one request and reports its outcome.
    ///
    /// `info.editing_bitstream` is read and updated in place. Store faults
    /// are returned as errors, never as outcomes.
    pub async fn process(
        &self,
        store: &mut dyn ContentStore,
        request: &StepRequest,
        info: &mut SubmissionInfo,
    ) -> AppResult<StepStatus> {
        let button = request.button();
        tracing::debug!(
            submission_id = info.submission_id,
            button,
            multipart = request.is_multipart(),
            "Processing upload step"
        );

        for stage in STAGES {
            if let Flow::Return(status) = self.run(stage, store, request, info, button).await? {
                tracing::debug!(?stage, code = status.code(), "Upload step finished");
                return Ok(status);
            }
        }
        Ok(StepStatus::Complete)
    }

    async fn run(
        &self,
        stage: Stage,
        store: &mut dyn ContentStore,
        request: &StepRequest,
        info: &mut SubmissionInfo,
        button: &str,
    ) -> AppResult<Flow> {
        let item_id = info.item_id;

        let flow: Flow = match stage {
            Stage::Ingest if request.is_multipart() => {
                self.ingest_uploads(store, request, info).await?.into()
            }
            Stage::Ingest => Flow::Continue,

            Stage::ProgressJump if button.starts_with(PROGRESS_BAR_PREFIX) => {
                Flow::Return(if store.has_uploaded_files(item_id).await? {
                    StepStatus::Complete
                } else {
                    StepStatus::NoFilesError
                })
            }
            Stage::ProgressJump => Flow::Continue,

            Stage::EditSelection => edit_selection(store, request, info, button).await?,

            Stage::RemoveSelected if button.eq_ignore_ascii_case(REMOVE_SELECTED_BUTTON) => {
                let ids: Vec<&str> = request.params("remove").collect();
                if !ids.is_empty() {
                    for raw in ids {
                        let status = match parse_id(raw) {
                            Some(id) => self.remove_file(store, item_id, id).await?,
                            None => StepStatus::IntegrityError,
                        };
                        if !status.is_success() {
                            return Ok(Flow::Return(status));
                        }
                    }
                    info.editing_bitstream = None;
                }
                Flow::Continue
            }
            Stage::RemoveSelected => Flow::Continue,

            Stage::RemoveSingle if !button.eq_ignore_ascii_case(REMOVE_SELECTED_BUTTON) => {
                match button.strip_prefix(REMOVE_PREFIX) {
                    Some(raw) => {
                        let status = match parse_id(raw) {
                            Some(id) => self.remove_file(store, item_id, id).await?,
                            None => StepStatus::IntegrityError,
                        };
                        if status.is_success() {
                            info.editing_bitstream = None;
                        }
                        status.into()
                    }
                    None => Flow::Continue,
                }
            }
            Stage::RemoveSingle => Flow::Continue,

            Stage::Description => match request.param("description").filter(|d| !d.is_empty()) {
                Some(description) => save_description(store, info, description).await?.into(),
                None => Flow::Continue,
            },

            Stage::Format => {
                let format_id = request
                    .param("format")
                    .and_then(|f| f.parse::<i32>().ok())
                    .unwrap_or(-1);
                let user_description = request.param("format_description");
                if format_id >= 0 || user_description.is_some_and(|d| !d.is_empty()) {
                    save_format(store, info, format_id, user_description).await?.into()
                } else {
                    Flow::Continue
                }
            }

            Stage::PrimaryBitstream => match request.param("primary_bitstream_id") {
                Some(raw) => match parse_id(raw) {
                    Some(primary) => {
                        let bundles = store.bundles_by_name(item_id, ORIGINAL_BUNDLE).await?;
                        if let Some(bundle) = bundles.first() {
                            store.set_primary_bitstream(bundle.id, Some(primary)).await?;
                        }
                        Flow::Continue
                    }
                    None => Flow::Return(StepStatus::IntegrityError),
                },
                None => Flow::Continue,
            },

            Stage::RequireFiles => {
                if store.has_uploaded_files(item_id).await? {
                    Flow::Continue
                } else {
                    Flow::Return(StepStatus::NoFilesError)
                }
            }

            Stage::CommitFiles => {
                store.commit().await?;
                Flow::Continue
            }

            Stage::RequiredCategories => {
                if self.needed_bitstreams(store, item_id).await?.is_empty() {
                    Flow::Continue
                } else {
                    Flow::Return(StepStatus::MissingBitstreams)
                }
            }

            Stage::PdfOnly => {
                if self.is_all_pdf(store, item_id).await? {
                    Flow::Continue
                } else {
                    Flow::Return(StepStatus::NotPdf)
                }
            }

            Stage::Finish => {
                store.commit().await?;
                Flow::Return(StepStatus::Complete)
            }
        };
        Ok(flow)
    }

    /// See [`ingest::ingest_uploads`].
    pub async fn ingest_uploads(
        &self,
        store: &mut dyn ContentStore,
        request: &StepRequest,
        info: &mut SubmissionInfo,
    ) -> AppResult<StepStatus> {
        ingest::ingest_uploads(store, request, info, &self.policy).await
    }

    pub async fn remove_file(
        &self,
        store: &mut dyn ContentStore,
        item_id: i32,
        bitstream_id: i32,
    ) -> AppResult<StepStatus> {
        checks::remove_file(store, item_id, bitstream_id).await
    }

    pub async fn needed_bitstreams(
        &self,
        store: &mut dyn ContentStore,
        item_id: i32,
    ) -> AppResult<Vec<String>> {
        checks::needed_bitstreams(store, item_id, &self.policy).await
    }

    /// Required categories for display, e.g. `A, B, C, D, and E`.
    pub fn list_needed_bitstreams(&self) -> String {
        self.policy.list_required()
    }

    pub async fn is_all_pdf(&self, store: &mut dyn ContentStore, item_id: i32) -> AppResult<bool> {
        checks::is_all_pdf(store, item_id, &self.policy).await
    }
}

async fn edit_selection(
    store: &mut dyn ContentStore,
    request: &StepRequest,
    info: &mut SubmissionInfo,
    button: &str,
) -> AppResult<Flow> {
    if let Some(raw) = request.param("bitstream_id") {
        if button == CANCEL_EDIT_BUTTON {
            info.editing_bitstream = None;
            return Ok(Flow::Return(StepStatus::EditComplete));
        }
        return Ok(match resolve(store, info.item_id, raw).await? {
            Some(id) => {
                info.editing_bitstream = Some(id);
                Flow::Continue
            }
            None => Flow::Return(StepStatus::IntegrityError),
        });
    }

    if let Some(raw) = button.strip_prefix(EDIT_PREFIX) {
        return Ok(Flow::Return(match resolve(store, info.item_id, raw).await? {
            Some(id) => {
                info.editing_bitstream = Some(id);
                StepStatus::EditBitstream
            }
            None => StepStatus::IntegrityError,
        }));
    }

    Ok(Flow::Continue)
}

async fn resolve(store: &mut dyn ContentStore, item_id: i32, raw: &str) -> AppResult<Option<i32>> {
    let Some(id) = parse_id(raw) else {
        return Ok(None);
    };
    Ok(find_item_bitstream(store, item_id, id).await?.map(|b| b.id))
}

async fn save_description(
    store: &mut dyn ContentStore,
    info: &SubmissionInfo,
    description: &str,
) -> AppResult<StepStatus> {
    let Some(mut bitstream) = editing(store, info).await? else {
        return Ok(StepStatus::IntegrityError);
    };
    bitstream.description = Some(description.to_string());
    store.update_bitstream(&bitstream).await?;
    store.commit().await?;
    Ok(StepStatus::Complete)
}

async fn save_format(
    store: &mut dyn ContentStore,
    info: &SubmissionInfo,
    format_id: i32,
    user_description: Option<&str>,
) -> AppResult<StepStatus> {
    let Some(mut bitstream) = editing(store, info).await? else {
        return Ok(StepStatus::IntegrityError);
    };
    match store.find_format(format_id).await? {
        Some(format) => bitstream.set_format(format.id),
        None => bitstream.set_user_format_description(user_description.map(str::to_string)),
    }
    store.update_bitstream(&bitstream).await?;
    Ok(StepStatus::Complete)
}

async fn editing(
    store: &mut dyn ContentStore,
    info: &SubmissionInfo,
) -> AppResult<Option<Bitstream>> {
    match info.editing_bitstream {
        Some(id) => find_item_bitstream(store, info.item_id, id).await,
        None => Ok(None),
    }
}
