//! Shared data model for NFT collection creation.
//! Pure data and validation, no I/O.

mod error;
mod form;
mod ipfs;
mod metadata;

pub use error::FormError;
pub use form::{CollectionForm, FormField};
pub use ipfs::{ipfs_uri, is_ipfs_uri, IPFS_SCHEME};
pub use metadata::{CollectionMetadata, TokenMetadata};
