//! In-memory stand-ins for the pinning service and the collection contract.

use collection_creator::abi::{self, Address, TokenId};
use collection_creator::rpc::{Log, TransactionReceipt};
use collection_creator::{
    CollectionFlow, Config, DropOutcome, Error, ImageFile, MintedEvent, Minting, Pinner, TokenContract,
};
use collection_types::FormField;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
pub const SIGNER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const TOKEN_MINTED: &str = "TokenMinted(address,uint256)";

#[derive(Debug, Clone, PartialEq)]
pub enum PinCall {
    File(String),
    Token(Value),
    Collection(Value),
}

/// Content-addressed by call order: the n-th pin returns `ipfs://QmPin{n}`.
#[derive(Default)]
pub struct MemoryPinner {
    pub calls: Mutex<Vec<PinCall>>,
    counter: AtomicU64,
    fail_file: Option<String>,
}

impl MemoryPinner {
    pub fn failing_on(name: &str) -> Self {
        Self {
            fail_file: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<PinCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_uri(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("ipfs://QmPin{n}")
    }
}

impl Pinner for MemoryPinner {
    async fn pin_file(&self, file: &ImageFile) -> Result<String, Error> {
        tokio::task::yield_now().await;
        self.calls
            .lock()
            .unwrap()
            .push(PinCall::File(file.name.clone()));
        if self.fail_file.as_deref() == Some(file.name.as_str()) {
            return Err(Error::Pinning(format!("{}: HTTP 403", file.name)));
        }
        Ok(self.next_uri())
    }

    async fn pin_json(&self, document: &Value) -> Result<String, Error> {
        let call = if document.get("external_link").is_some() {
            PinCall::Collection(document.clone())
        } else {
            PinCall::Token(document.clone())
        };
        self.calls.lock().unwrap().push(call);
        Ok(self.next_uri())
    }
}

/// Collection contract with sequential token ids.
/// Mint attempts whose 1-based number is in `revert_mints` revert.
#[derive(Default)]
pub struct ChainContract {
    next_token: AtomicU64,
    mint_attempts: AtomicU64,
    revert_mints: HashSet<u64>,
    pub owners: Mutex<HashMap<u128, Address>>,
    pub token_uris: Mutex<HashMap<u128, String>>,
}

impl ChainContract {
    pub fn reverting(attempts: &[u64]) -> Self {
        Self {
            revert_mints: attempts.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn mint_attempts(&self) -> u64 {
        self.mint_attempts.load(Ordering::SeqCst)
    }

    pub fn token_uri(&self, id: u128) -> Option<String> {
        self.token_uris.lock().unwrap().get(&id).cloned()
    }
}

fn receipt(logs: Vec<Log>, ok: bool) -> TransactionReceipt {
    TransactionReceipt {
        transaction_hash: format!("0x{}", "ab".repeat(32)),
        block_number: Some("0x1".into()),
        status: Some(if ok { "0x1" } else { "0x0" }.into()),
        logs,
    }
}

impl TokenContract for ChainContract {
    fn signer(&self) -> Address {
        SIGNER.parse().unwrap()
    }

    async fn mint(&self, to: &Address) -> Result<TransactionReceipt, Error> {
        let attempt = self.mint_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.revert_mints.contains(&attempt) {
            return Err(Error::Contract("mint reverted".into()));
        }
        let id = self.next_token.fetch_add(1, Ordering::SeqCst) as u128 + 1;
        self.owners.lock().unwrap().insert(id, *to);

        let mut data = vec![0u8; 12];
        data.extend_from_slice(&to.0);
        data.extend_from_slice(&TokenId::from(id).0);
        let log = Log {
            address: CONTRACT.parse().unwrap(),
            topics: vec![abi::to_hex(&abi::event_topic(TOKEN_MINTED))],
            data: abi::to_hex(&data),
        };
        Ok(receipt(vec![log], true))
    }

    async fn set_token_uri(&self, token_id: &TokenId, uri: &str) -> Result<TransactionReceipt, Error> {
        let id = token_id
            .as_u128()
            .ok_or_else(|| Error::Contract("token id out of range".into()))?;
        if !self.owners.lock().unwrap().contains_key(&id) {
            return Err(Error::Contract(format!("token {id} does not exist")));
        }
        self.token_uris.lock().unwrap().insert(id, uri.to_string());
        Ok(receipt(Vec::new(), true))
    }
}

/// `TokenMinted` as the default configuration locates it.
pub fn minted_event() -> MintedEvent {
    let config = Config::default();
    assert_eq!(config.token_minted_event, TOKEN_MINTED);
    MintedEvent::new(
        CONTRACT.parse().unwrap(),
        &config.token_minted_event,
        config.token_id_slot().unwrap(),
    )
}

pub fn images(n: usize) -> Vec<ImageFile> {
    (1..=n)
        .map(|i| ImageFile::new(format!("frame-{i:02}.png"), "image/png", vec![i as u8; 8]))
        .collect()
}

/// Filled-in flow with `files` already dropped.
pub fn flow_with(
    pinner: Arc<MemoryPinner>,
    contract: Option<ChainContract>,
    files: Vec<ImageFile>,
) -> CollectionFlow<MemoryPinner, ChainContract> {
    let minting = contract.map(|contract| Minting {
        contract,
        event: minted_event(),
    });
    let mut flow = CollectionFlow::new(pinner, minting);
    flow.set_field(FormField::Name, "Night Trains");
    flow.set_field(FormField::Symbol, "NTRN");
    flow.set_field(FormField::Description, "Long exposures of night trains");
    flow.drop_files(DropOutcome {
        accepted: files,
        rejected: Vec::new(),
    });
    flow
}
