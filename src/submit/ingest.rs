use crate::content::{ContentStore, FormatIdentifier, NewContent};
use crate::error::AppResult;
use crate::submit::checks::detach;
use crate::submit::{StepRequest, StepStatus, SubmissionInfo, UploadPolicy};

const PATH_SUFFIX: &str = "-path";
const STREAM_SUFFIX: &str = "-inputstream";
const DESCRIPTION_SUFFIX: &str = "-description";

/// Last component of a client path, for both `/` and `\` separators.
pub fn strip_directories(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Stores every staged upload of the request as a bitstream of the item.
///
/// Uploads are processed in request order and each accepted one is
/// committed on its own. Stops at the first upload that is incomplete or of
/// an internal format.
pub async fn ingest_uploads(
    store: &mut dyn ContentStore,
    request: &StepRequest,
    info: &mut SubmissionInfo,
    policy: &UploadPolicy,
) -> AppResult<StepStatus> {
    let item_id = info.item_id;
    let mut format_known = true;

    let fields: Vec<&str> = request
        .attribute_names()
        .filter_map(|name| name.strip_suffix(PATH_SUFFIX))
        .collect();

    for field in fields {
        let path = request.text_attribute(&format!("{field}{PATH_SUFFIX}"));
        let stream = request.bytes_attribute(&format!("{field}{STREAM_SUFFIX}"));
        let (Some(path), Some(bytes)) = (path, stream) else {
            tracing::info!(field, "Upload error: missing path or content");
            return Ok(StepStatus::UploadError);
        };

        let description = non_empty(request.text_attribute(&format!("{field}{DESCRIPTION_SUFFIX}")))
            .or_else(|| non_empty(request.param("description")));

        let bundle_name = policy.bundle_for(description);
        let bundle = match store.bundles_by_name(item_id, bundle_name).await?.into_iter().next() {
            Some(bundle) => bundle,
            None => store.create_bundle(item_id, bundle_name).await?,
        };

        let name = strip_directories(path);
        let mut bitstream = store
            .create_bitstream(
                bundle.id,
                NewContent {
                    name,
                    source: path,
                    description,
                    bytes,
                },
            )
            .await?;

        let format = FormatIdentifier::guess(store, name).await?;
        if let Some(format) = &format {
            bitstream.set_format(format.id);
            store.update_bitstream(&bitstream).await?;
        }
        store.touch_item(item_id).await?;

        if format.as_ref().is_some_and(|f| f.internal) {
            tracing::warn!(
                item_id,
                name,
                "Attempt to upload file format marked as internal system use only"
            );
            detach(store, item_id, bundle.id, bitstream.id).await?;
            info.editing_bitstream = None;
            tracing::error!(item_id, field, "Upload error: internal format rejected");
            return Ok(StepStatus::UploadError);
        }

        store.commit().await?;
        info.editing_bitstream = Some(bitstream.id);
        tracing::info!(
            item_id,
            bitstream_id = bitstream.id,
            bundle = bundle_name,
            size = bytes.len(),
            "Stored uploaded file"
        );

        if format.is_none() {
            format_known = false;
        }
    }

    Ok(if format_known {
        StepStatus::Complete
    } else {
        StepStatus::UnknownFormat
    })
}
