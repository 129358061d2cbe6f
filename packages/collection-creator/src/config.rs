//! Collection creator configuration.

use collection_types::CollectionForm;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::abi::{Address, TokenIdSlot};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "collection";

/// Configuration for a collection creation run.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::pinata_jwt")]
    pub pinata_jwt: String,

    #[serde(default = "defaults::pinata_api_url")]
    pub pinata_api_url: String,

    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    #[serde(default)]
    pub fallback_rpc_url: Option<String>,

    #[serde(default = "defaults::contract_address")]
    pub contract_address: String,

    /// Signing account. Falls back to the provider's first account.
    #[serde(default)]
    pub from_address: Option<String>,

    #[serde(default = "defaults::max_file_bytes")]
    pub max_file_bytes: u64,

    #[serde(default = "defaults::http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default = "defaults::receipt_poll_ms")]
    pub receipt_poll_ms: u64,

    #[serde(default = "defaults::receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,

    #[serde(default = "defaults::token_minted_event")]
    pub token_minted_event: String,

    /// `data:N` or `topic:N`. The default fits `TokenMinted(address to, uint256 tokenId)`
    /// with neither parameter indexed: word 0 is `to`, word 1 the id.
    #[serde(default = "defaults::token_id_slot")]
    pub token_id_slot: String,

    #[serde(default = "defaults::mint_enabled")]
    pub mint_enabled: bool,

    #[serde(default)]
    pub collection: CollectionManifest,
}

/// The `[collection]` table: form fields plus the image paths to drop.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionManifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    /// Files or directories. Directories are expanded one level, sorted by name.
    #[serde(default)]
    pub images: Vec<PathBuf>,
}

impl CollectionManifest {
    pub fn form(&self) -> CollectionForm {
        CollectionForm {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            description: self.description.clone(),
            image_urls: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pinata_jwt: defaults::pinata_jwt(),
            pinata_api_url: defaults::pinata_api_url(),
            rpc_url: defaults::rpc_url(),
            fallback_rpc_url: None,
            contract_address: defaults::contract_address(),
            from_address: None,
            max_file_bytes: defaults::max_file_bytes(),
            http_timeout_secs: defaults::http_timeout_secs(),
            receipt_poll_ms: defaults::receipt_poll_ms(),
            receipt_timeout_secs: defaults::receipt_timeout_secs(),
            token_minted_event: defaults::token_minted_event(),
            token_id_slot: defaults::token_id_slot(),
            mint_enabled: defaults::mint_enabled(),
            collection: CollectionManifest::default(),
        }
    }
}

impl Config {
    /// Layer `path` (or `collection.toml` if present) under `CREATOR_*` env vars.
    ///
    /// `CREATOR_RPC_URL`, `CREATOR_COLLECTION__NAME`, and
    /// `CREATOR_COLLECTION__IMAGES=a.png,b.png` all map onto their fields.
    pub fn load(path: Option<&str>) -> Result<Self, crate::Error> {
        let file = match path {
            Some(p) => config::File::with_name(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("CREATOR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("collection.images"),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| crate::Error::Config(e.to_string()))
    }

    pub fn contract_address(&self) -> Result<Address, crate::Error> {
        self.contract_address
            .parse()
            .map_err(|e| crate::Error::Config(format!("contract_address: {e}")))
    }

    pub fn from_address(&self) -> Result<Option<Address>, crate::Error> {
        self.from_address
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .map_err(|e| crate::Error::Config(format!("from_address: {e}")))
            })
            .transpose()
    }

    pub fn token_id_slot(&self) -> Result<TokenIdSlot, crate::Error> {
        self.token_id_slot
            .parse()
            .map_err(|e| crate::Error::Config(format!("token_id_slot: {e}")))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    /// Fails fast on settings that would only surface mid-run.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.pinata_jwt.is_empty() {
            return Err(crate::Error::Config(
                "PINATA_JWT is not set (or pinata_jwt in config)".into(),
            ));
        }
        if self.max_file_bytes == 0 {
            return Err(crate::Error::Config("max_file_bytes must be positive".into()));
        }
        if self.mint_enabled {
            self.contract_address()?;
            self.from_address()?;
            self.token_id_slot()?;
            if self.receipt_poll_ms == 0 {
                return Err(crate::Error::Config("receipt_poll_ms must be positive".into()));
            }
        }
        Ok(())
    }
}

mod defaults {
    pub fn pinata_jwt() -> String {
        std::env::var("PINATA_JWT").unwrap_or_default()
    }

    pub fn pinata_api_url() -> String {
        "https://api.pinata.cloud".into()
    }

    pub fn rpc_url() -> String {
        "http://127.0.0.1:8545".into()
    }

    /// First deployment address of a fresh local dev chain.
    pub fn contract_address() -> String {
        "0x5FbDB2315678afecb367f032d93F642f64180aa3".into()
    }

    pub fn max_file_bytes() -> u64 {
        5 * 1024 * 1024
    }

    pub fn http_timeout_secs() -> u64 {
        60
    }

    pub fn receipt_poll_ms() -> u64 {
        1_000
    }

    pub fn receipt_timeout_secs() -> u64 {
        120
    }

    pub fn token_minted_event() -> String {
        "TokenMinted(address,uint256)".into()
    }

    pub fn token_id_slot() -> String {
        "data:1".into()
    }

    pub fn mint_enabled() -> bool {
        true
    }
}
