//! Submit results and the notification derived from them.

use serde::Serialize;
use std::fmt;

use crate::abi::TokenId;
use crate::upload::UploadManifest;

/// Step of the per-image mint sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MintStage {
    Mint,
    DecodeEvent,
    SetTokenUri,
}

impl fmt::Display for MintStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mint => write!(f, "mint"),
            Self::DecodeEvent => write!(f, "decode TokenMinted"),
            Self::SetTokenUri => write!(f, "setTokenURI"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MintOutcome {
    Minted {
        index: usize,
        #[serde(serialize_with = "token_id_string")]
        token_id: TokenId,
        metadata_uri: String,
    },
    Failed {
        index: usize,
        metadata_uri: String,
        stage: MintStage,
        error: String,
    },
}

fn token_id_string<S: serde::Serializer>(id: &TokenId, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(id)
}

impl MintOutcome {
    pub fn is_minted(&self) -> bool {
        matches!(self, Self::Minted { .. })
    }
}

/// What the user is told at the end of a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success,
    PartialFailure { minted: usize, failed: usize },
    /// Nothing was created: the submit was refused or an upload failed.
    Failed { reason: String },
}

impl Notification {
    pub fn failed(error: &crate::Error) -> Self {
        Self::Failed {
            reason: error.to_string(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Collection created successfully!"),
            Self::PartialFailure { minted, failed } => write!(
                f,
                "Collection created, but {failed} of {} mints failed",
                minted + failed
            ),
            Self::Failed { reason } => write!(f, "Error creating collection: {reason}"),
        }
    }
}

/// Result of a successful upload plus whatever the mint stage achieved.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReport {
    pub manifest: UploadManifest,
    /// Empty when minting is disabled.
    pub mints: Vec<MintOutcome>,
}

impl SubmitReport {
    pub fn minted(&self) -> usize {
        self.mints.iter().filter(|m| m.is_minted()).count()
    }

    pub fn failed(&self) -> usize {
        self.mints.len() - self.minted()
    }

    pub fn notification(&self) -> Notification {
        match self.failed() {
            0 => Notification::Success,
            failed => Notification::PartialFailure {
                minted: self.minted(),
                failed,
            },
        }
    }
}
