use utoipa::OpenApi;

pub const SUBMISSION_TAG: &str = "Submissions";
pub const FORMAT_TAG: &str = "Formats";
pub const LOCALE_TAG: &str = "Locale";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Deposit",
        description = "Submission upload step and locale resolution for an institutional repository",
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::error::ValidationFieldError,
            crate::submit::StepStatus,
            crate::i18n::LocaleSource,
        )
    ),
    tags(
        (name = SUBMISSION_TAG, description = "Submission and upload step endpoints"),
        (name = FORMAT_TAG, description = "Bitstream format registry"),
        (name = LOCALE_TAG, description = "Request locale resolution"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
