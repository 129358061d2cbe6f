//! Upload pipeline: images, then per-image metadata, then collection metadata.
//!
//! Each stage is a concurrent all-or-nothing batch. The first failure aborts
//! the remaining tasks and the whole upload.

use collection_types::{CollectionForm, CollectionMetadata, TokenMetadata};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::info;

use crate::pinning::Pinner;
use crate::selection::ImageFile;

/// Every URI produced by a successful upload, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadManifest {
    pub image_uris: Vec<String>,
    pub metadata_uris: Vec<String>,
    pub collection_uri: String,
}

/// Pin `files` and their metadata. Nothing is minted if this fails.
pub async fn upload_collection<P>(
    pinner: &Arc<P>,
    form: &CollectionForm,
    files: &[ImageFile],
) -> Result<UploadManifest, crate::Error>
where
    P: Pinner + 'static,
{
    if files.is_empty() {
        return Err(crate::Error::NothingSelected);
    }

    info!(count = files.len(), "Pinning images");
    let image_uris = pin_batch(pinner, files.to_vec(), |pinner, file: ImageFile| async move {
        pinner.pin_file(&file).await
    })
    .await?;

    let documents = image_uris
        .iter()
        .enumerate()
        .map(|(index, uri)| to_document(&TokenMetadata::for_item(form, index, uri)))
        .collect::<Result<Vec<_>, _>>()?;

    info!(count = documents.len(), "Pinning token metadata");
    let metadata_uris = pin_batch(pinner, documents, |pinner, doc: Value| async move {
        pinner.pin_json(&doc).await
    })
    .await?;

    let collection = CollectionMetadata::from_form(form, &image_uris)
        .ok_or(crate::Error::NothingSelected)?;
    let collection_uri = pinner.pin_json(&to_document(&collection)?).await?;
    info!(uri = %collection_uri, "Collection metadata pinned");

    Ok(UploadManifest {
        image_uris,
        metadata_uris,
        collection_uri,
    })
}

fn to_document<T: Serialize>(doc: &T) -> Result<Value, crate::Error> {
    serde_json::to_value(doc)
        .map_err(|e| crate::Error::Pinning(format!("metadata serialization: {e}")))
}

/// Run `pin` over `items` concurrently. Results keep input order.
async fn pin_batch<P, T, F, Fut>(
    pinner: &Arc<P>,
    items: Vec<T>,
    pin: F,
) -> Result<Vec<String>, crate::Error>
where
    P: Pinner + 'static,
    T: Send + 'static,
    F: Fn(Arc<P>, T) -> Fut,
    Fut: Future<Output = Result<String, crate::Error>> + Send + 'static,
{
    let count = items.len();
    let mut tasks = JoinSet::new();
    for (index, item) in items.into_iter().enumerate() {
        let fut = pin(Arc::clone(pinner), item);
        tasks.spawn(async move { (index, fut.await) });
    }

    let mut uris: Vec<Option<String>> = vec![None; count];
    while let Some(joined) = tasks.join_next().await {
        let (index, result) =
            joined.map_err(|e| crate::Error::Pinning(format!("pin task panicked: {e}")))?;
        // Returning here drops `tasks`, which aborts whatever is still running.
        uris[index] = Some(result?);
    }

    uris.into_iter()
        .enumerate()
        .map(|(index, uri)| {
            uri.ok_or_else(|| crate::Error::Pinning(format!("no result for item {index}")))
        })
        .collect()
}
