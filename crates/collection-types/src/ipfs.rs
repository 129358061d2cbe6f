//! IPFS URI construction.

/// Scheme prefixed to every content hash returned by the pinning service.
pub const IPFS_SCHEME: &str = "ipfs://";

/// `ipfs://<hash>`.
pub fn ipfs_uri(hash: &str) -> String {
    format!("{IPFS_SCHEME}{hash}")
}

pub fn is_ipfs_uri(uri: &str) -> bool {
    uri.strip_prefix(IPFS_SCHEME)
        .is_some_and(|hash| !hash.is_empty())
}
