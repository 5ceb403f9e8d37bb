//! Extractor turning an upload step submission into a [`StepRequest`].

use std::collections::HashSet;

use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::header;

use crate::error::{AppError, AppResult};
use crate::submit::{Attribute, StepRequest};

const DESCRIPTION_SUFFIX: &str = "-description";

/// Upload step request read from `multipart/form-data` or
/// `application/x-www-form-urlencoded`.
///
/// A file part `f` becomes attributes `f-path` (client filename, as sent)
/// and `f-inputstream` (content). Further file parts under the same name
/// are staged as `f_2`, `f_3` and so on. File parts without a filename are
/// skipped. Text parts become parameters; those named `*-description` are
/// also copied to attributes.
#[derive(Debug)]
pub struct StepForm(pub StepRequest);

impl<S> FromRequest<S> for StepForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await?;
            Ok(StepForm(read_multipart(multipart).await?))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state).await?;
            let mut request = StepRequest::form();
            for (name, value) in pairs {
                request.push_param(name, value);
            }
            Ok(StepForm(request))
        } else {
            Err(AppError::bad_request(format!(
                "Expected multipart/form-data or application/x-www-form-urlencoded, got '{}'",
                content_type
            )))
        }
    }
}

/// First free staged name for a file part called `name`.
fn staged_name(name: &str, staged: &HashSet<String>) -> String {
    if !staged.contains(name) {
        return name.to_string();
    }
    (2..)
        .map(|n| format!("{name}_{n}"))
        .find(|candidate| !staged.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<StepRequest> {
    let mut request = StepRequest::multipart();
    let mut staged = HashSet::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) if file_name.is_empty() => {
                tracing::debug!(field = %name, "Skipping file part without a filename");
            }
            Some(file_name) => {
                let bytes = field.bytes().await?;
                let stage = staged_name(&name, &staged);
                tracing::debug!(field = %name, staged = %stage, file_name = %file_name, size = bytes.len(), "Received file part");
                request.push_attribute(format!("{stage}-path"), Attribute::Text(file_name));
                request.push_attribute(
                    format!("{stage}-inputstream"),
                    Attribute::Bytes(bytes.to_vec()),
                );
                staged.insert(stage);
            }
            None => {
                let value = field.text().await?;
                if name.ends_with(DESCRIPTION_SUFFIX) {
                    request.push_attribute(name.clone(), Attribute::Text(value.clone()));
                }
                request.push_param(name, value);
            }
        }
    }

    Ok(request)
}
