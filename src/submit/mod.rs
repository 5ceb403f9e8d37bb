//! File upload step of the library award submission workflow.
//!
//! [`UploadStep::process`] takes one request through a fixed sequence of
//! stages (ingest uploads, edit selection, removals, metadata edits, then
//! the completeness checks) and reports a [`StepStatus`].

mod checks;
mod ingest;
mod policy;
mod request;
mod status;
mod upload_step;

pub use checks::{find_item_bitstream, is_all_pdf, needed_bitstreams, remove_file};
pub use ingest::{ingest_uploads, strip_directories};
pub use policy::{OCTET_STREAM, UploadPolicy};
pub use request::{
    Attribute, NEXT_BUTTON, PROGRESS_BAR_PREFIX, RequestKind, StepRequest, SubmissionInfo,
};
pub use status::StepStatus;
pub use upload_step::{
    CANCEL_EDIT_BUTTON, EDIT_PREFIX, MORE_BUTTON, REMOVE_PREFIX, REMOVE_SELECTED_BUTTON,
    SKIP_BUTTON, UPLOAD_BUTTON, UploadStep,
};
