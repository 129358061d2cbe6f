//! # Collection Creator
//!
//! Creates an NFT collection from a folder of images. Pins each image and its
//! metadata to IPFS through Pinata, then mints one token per image on an EVM
//! contract through a wallet provider that signs on our behalf.
//!
//! ## Quick Start
//! ```bash
//! PINATA_JWT=... cargo run --bin create-collection -- collection.toml
//! ```
//!
//! ## Flow
//! - Pin images (concurrent, all-or-nothing)
//! - Pin one metadata document per image, then the collection document
//! - For each metadata URI: `mint(signer)`, read `TokenMinted`, `setTokenURI`

pub mod abi;
pub mod config;
pub mod contract;
mod error;
pub mod flow;
pub mod metrics;
pub mod mint;
pub mod pinning;
pub mod report;
pub mod rpc;
pub mod selection;
#[cfg(test)]
mod test_server;
pub mod upload;

pub use config::Config;
pub use contract::{EvmContract, MintedEvent, TokenContract};
pub use error::Error;
pub use flow::{CollectionFlow, Minting};
pub use pinning::{PinataClient, Pinner};
pub use report::{MintOutcome, MintStage, Notification, SubmitReport};
pub use selection::{DropOutcome, DropPolicy, FileSelection, ImageFile};
pub use upload::UploadManifest;
