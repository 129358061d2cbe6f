//! Drop zone: files on disk through the policy into a submitted collection.

use anyhow::Result;
use collection_creator::selection::{expand_paths, RejectReason};
use collection_creator::DropPolicy;
use std::path::PathBuf;
use std::sync::Arc;

use crate::utils::{flow_with, MemoryPinner, PinCall};

fn scratch_dir(name: &str) -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[tokio::test]
async fn test_only_accepted_images_are_pinned() -> Result<()> {
    let dir = scratch_dir("collection_drop_zone_accepted")?;
    std::fs::write(dir.join("01.png"), [0x89, b'P', b'N', b'G'])?;
    std::fs::write(dir.join("02.txt"), b"not an image")?;
    std::fs::write(dir.join("03.GIF"), b"GIF89a")?;
    std::fs::write(dir.join("04.jpeg"), vec![0u8; 2048])?;

    let paths = expand_paths(&[dir.clone()]).await?;
    let outcome = DropPolicy::new(1024).drop_files(&paths).await?;

    assert_eq!(outcome.rejected.len(), 2);
    assert_eq!(outcome.rejected[0].reason, RejectReason::NotAnImage);
    assert!(matches!(
        outcome.rejected[1].reason,
        RejectReason::TooLarge { size: 2048, max: 1024 }
    ));

    let pinner = Arc::new(MemoryPinner::default());
    let flow = flow_with(Arc::clone(&pinner), None, outcome.accepted);
    flow.submit().await?;

    let mut files: Vec<String> = pinner
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            PinCall::File(name) => Some(name),
            _ => None,
        })
        .collect();
    files.sort();
    assert_eq!(files, vec!["01.png", "03.GIF"]);

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[tokio::test]
async fn test_new_drop_replaces_previous_selection() -> Result<()> {
    let dir = scratch_dir("collection_drop_zone_replace")?;
    std::fs::write(dir.join("a.png"), b"a")?;
    std::fs::write(dir.join("b.png"), b"b")?;
    let policy = DropPolicy::new(1024);

    let pinner = Arc::new(MemoryPinner::default());
    let mut flow = flow_with(Arc::clone(&pinner), None, Vec::new());
    flow.drop_files(policy.drop_files(&[dir.join("a.png"), dir.join("b.png")]).await?);
    assert_eq!(flow.selection().len(), 2);

    flow.drop_files(policy.drop_files(&[dir.join("b.png")]).await?);
    assert_eq!(flow.selection().len(), 1);
    assert_eq!(flow.selection().files()[0].name, "b.png");

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}
