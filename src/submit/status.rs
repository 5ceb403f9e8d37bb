use serde::Serialize;
use utoipa::ToSchema;

/// Outcome of one pass through the upload step.
///
/// Each outcome has a stable integer code; zero is success. Outcomes are
/// results the user interface reacts to, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Complete,
    IntegrityError,
    UploadError,
    NoFilesError,
    UnknownFormat,
    EditBitstream,
    EditComplete,
    MissingBitstreams,
    NotPdf,
}

impl StepStatus {
    pub const ALL: [StepStatus; 9] = [
        Self::Complete,
        Self::IntegrityError,
        Self::UploadError,
        Self::NoFilesError,
        Self::UnknownFormat,
        Self::EditBitstream,
        Self::EditComplete,
        Self::MissingBitstreams,
        Self::NotPdf,
    ];

    pub const fn code(self) -> i32 {
        match self {
            Self::Complete => 0,
            Self::IntegrityError => 1,
            Self::UploadError => 2,
            Self::NoFilesError => 5,
            Self::UnknownFormat => 10,
            Self::EditBitstream => 20,
            Self::EditComplete => 25,
            Self::MissingBitstreams => 30,
            Self::NotPdf => 35,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Complete)
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::Complete => "Upload step complete",
            Self::IntegrityError => "The request referenced a file that does not exist",
            Self::UploadError => "The file could not be uploaded",
            Self::NoFilesError => "At least one file must be uploaded",
            Self::UnknownFormat => "The format of the uploaded file is not recognised",
            Self::EditBitstream => "Editing file information",
            Self::EditComplete => "Finished editing file information",
            Self::MissingBitstreams => "Some required files have not been uploaded",
            Self::NotPdf => "All files must be PDF documents",
        }
    }
}
