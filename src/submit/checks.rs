//! Queries and removals the upload step shares with the submission API.

use crate::content::ContentStore;
use crate::error::AppResult;
use crate::models::Bitstream;
use crate::submit::StepStatus;
use crate::submit::policy::{OCTET_STREAM, UploadPolicy};

/// Parses a bitstream id the way form fields carry it. No trimming.
pub(crate) fn parse_id(raw: &str) -> Option<i32> {
    raw.parse().ok()
}

/// A live bitstream that belongs to a bundle of the item.
pub async fn find_item_bitstream(
    store: &mut dyn ContentStore,
    item_id: i32,
    bitstream_id: i32,
) -> AppResult<Option<Bitstream>> {
    let Some(bitstream) = store.find_bitstream(bitstream_id).await? else {
        return Ok(None);
    };
    let owned = store
        .bitstream_bundles(bitstream_id)
        .await?
        .iter()
        .any(|b| b.item_id == item_id);
    Ok(owned.then_some(bitstream))
}

/// Removes a bitstream from a bundle of the item, dropping the bundle when it
/// ends up empty.
pub(crate) async fn detach(
    store: &mut dyn ContentStore,
    item_id: i32,
    bundle_id: i32,
    bitstream_id: i32,
) -> AppResult<()> {
    store.remove_bitstream(bundle_id, bitstream_id).await?;

    if store.bundle_bitstreams(bundle_id).await?.is_empty() {
        store.remove_bundle(item_id, bundle_id).await?;
        store.touch_item(item_id).await?;
        tracing::debug!(item_id, bundle_id, "Removed empty bundle");
    } else {
        let primary = store
            .item_bundles(item_id)
            .await?
            .into_iter()
            .find(|b| b.id == bundle_id)
            .and_then(|b| b.primary_bitstream_id);
        if primary == Some(bitstream_id) {
            store.set_primary_bitstream(bundle_id, None).await?;
        }
    }
    Ok(())
}

/// Removes one of the item's files from its bundle.
///
/// Returns [`StepStatus::IntegrityError`] when the id names no live file of
/// this item.
pub async fn remove_file(
    store: &mut dyn ContentStore,
    item_id: i32,
    bitstream_id: i32,
) -> AppResult<StepStatus> {
    if store.find_bitstream(bitstream_id).await?.is_none() {
        tracing::debug!(bitstream_id, "Remove requested for unknown bitstream");
        return Ok(StepStatus::IntegrityError);
    }

    let bundle = store
        .bitstream_bundles(bitstream_id)
        .await?
        .into_iter()
        .find(|b| b.item_id == item_id);
    let Some(bundle) = bundle else {
        tracing::debug!(bitstream_id, item_id, "Bitstream is not part of this item");
        return Ok(StepStatus::IntegrityError);
    };

    detach(store, item_id, bundle.id, bitstream_id).await?;
    tracing::info!(item_id, bitstream_id, "Removed file from submission");
    Ok(StepStatus::Complete)
}

/// Required categories, in policy order, that no non-internal file's
/// description matches exactly.
pub async fn needed_bitstreams(
    store: &mut dyn ContentStore,
    item_id: i32,
    policy: &UploadPolicy,
) -> AppResult<Vec<String>> {
    let files = store.non_internal_bitstreams(item_id).await?;

    let needed: Vec<String> = policy
        .required_files
        .iter()
        .filter(|required| {
            let present = files
                .iter()
                .any(|(b, _)| b.description.as_deref() == Some(required.as_str()));
            tracing::debug!(category = %required, present, "Checked required file");
            !present
        })
        .cloned()
        .collect();

    tracing::debug!(item_id, ?needed, "Needed files");
    Ok(needed)
}

/// True when every non-internal file has the required MIME type. Files of
/// unknown format count as `application/octet-stream`.
pub async fn is_all_pdf(
    store: &mut dyn ContentStore,
    item_id: i32,
    policy: &UploadPolicy,
) -> AppResult<bool> {
    let files = store.non_internal_bitstreams(item_id).await?;
    Ok(files.iter().all(|(_, format)| {
        let mime = format.as_ref().map_or(OCTET_STREAM, |f| f.mime_type.as_str());
        mime == policy.required_mime_type
    }))
}
