//! Upload stage: batch ordering, positional results, all-or-nothing failure.

use anyhow::Result;
use collection_creator::{Error, Notification};
use collection_types::is_ipfs_uri;
use serde_json::json;
use std::sync::Arc;

use crate::utils::{flow_with, images, ChainContract, MemoryPinner, PinCall};

#[tokio::test]
async fn test_n_images_produce_n_plus_n_plus_one_pins_in_order() -> Result<()> {
    let pinner = Arc::new(MemoryPinner::default());
    let flow = flow_with(Arc::clone(&pinner), None, images(4));

    let report = flow.submit().await?;
    let calls = pinner.calls();

    assert_eq!(calls.len(), 9);
    assert!(calls[..4].iter().all(|c| matches!(c, PinCall::File(_))));
    assert!(calls[4..8].iter().all(|c| matches!(c, PinCall::Token(_))));
    assert!(matches!(calls[8], PinCall::Collection(_)));

    assert_eq!(report.manifest.image_uris.len(), 4);
    assert_eq!(report.manifest.metadata_uris.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_every_uri_has_ipfs_scheme() -> Result<()> {
    let pinner = Arc::new(MemoryPinner::default());
    let flow = flow_with(pinner, None, images(3));

    let manifest = flow.submit().await?.manifest;
    let all = manifest
        .image_uris
        .iter()
        .chain(&manifest.metadata_uris)
        .chain(std::iter::once(&manifest.collection_uri));
    for uri in all {
        assert!(is_ipfs_uri(uri), "{uri} lacks ipfs:// prefix");
    }
    Ok(())
}

#[tokio::test]
async fn test_metadata_documents_are_captioned_by_position() -> Result<()> {
    let pinner = Arc::new(MemoryPinner::default());
    let flow = flow_with(Arc::clone(&pinner), None, images(2));
    let manifest = flow.submit().await?.manifest;

    let mut tokens: Vec<_> = pinner
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            PinCall::Token(doc) => Some(doc),
            _ => None,
        })
        .collect();
    tokens.sort_by_key(|doc| doc["name"].as_str().unwrap_or_default().to_string());

    for (index, doc) in tokens.iter().enumerate() {
        assert_eq!(
            *doc,
            json!({
                "name": format!("Night Trains #{}", index + 1),
                "description": "Long exposures of night trains",
                "image": manifest.image_uris[index],
                "attributes": []
            })
        );
    }

    let collection = pinner
        .calls()
        .into_iter()
        .find_map(|c| match c {
            PinCall::Collection(doc) => Some(doc),
            _ => None,
        })
        .expect("collection metadata pinned");
    assert_eq!(collection["image"], json!(manifest.image_uris[0]));
    assert_eq!(collection["external_link"], json!(""));
    Ok(())
}

#[tokio::test]
async fn test_rejected_upload_prevents_every_mint() -> Result<()> {
    let pinner = Arc::new(MemoryPinner::failing_on("frame-02.png"));
    let flow = flow_with(Arc::clone(&pinner), Some(ChainContract::default()), images(3));

    let result = flow.submit().await;
    assert!(matches!(result, Err(Error::Pinning(_))));
    let notification = result
        .map(|report| report.notification())
        .unwrap_or_else(|e| Notification::failed(&e));
    assert!(matches!(notification, Notification::Failed { .. }));

    assert!(pinner
        .calls()
        .iter()
        .all(|c| matches!(c, PinCall::File(_))));
    let contract = flow.contract().expect("minting enabled");
    assert_eq!(contract.mint_attempts(), 0);
    assert!(!flow.is_submitting());
    Ok(())
}

#[tokio::test]
async fn test_zero_files_disables_submit() -> Result<()> {
    let pinner = Arc::new(MemoryPinner::default());
    let flow = flow_with(Arc::clone(&pinner), Some(ChainContract::default()), Vec::new());

    assert!(!flow.can_submit());
    assert!(matches!(flow.submit().await, Err(Error::NothingSelected)));
    assert!(pinner.calls().is_empty());
    Ok(())
}
