//! Minimal Ethereum ABI support for the collection contract.
//!
//! Covers exactly what minting needs: `mint(address)`,
//! `setTokenURI(uint256,string)`, and reading a uint256 out of an event log.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

const WORD: usize = 32;

pub const MINT_SIGNATURE: &str = "mint(address)";
pub const SET_TOKEN_URI_SIGNATURE: &str = "setTokenURI(uint256,string)";

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// First four bytes of the keccak hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `topics[0]` of a non-anonymous event.
pub fn event_topic(signature: &str) -> [u8; 32] {
    keccak256(signature.as_bytes())
}

/// 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| format!("address must start with 0x: {s}"))?;
        let bytes = hex::decode(hex_part).map_err(|e| format!("invalid address {s}: {e}"))?;
        let raw: [u8; 20] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| format!("address must be 20 bytes, got {}", b.len()))?;
        Ok(Address(raw))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// uint256 token identifier, stored big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub [u8; 32]);

impl From<u128> for TokenId {
    fn from(value: u128) -> Self {
        let mut word = [0u8; 32];
        word[16..].copy_from_slice(&value.to_be_bytes());
        TokenId(word)
    }
}

impl TokenId {
    pub fn as_u128(&self) -> Option<u128> {
        if self.0[..16].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[16..]);
        Some(u128::from_be_bytes(low))
    }
}

/// Decimal when it fits in 128 bits, hex otherwise.
impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_u128() {
            Some(v) => write!(f, "{v}"),
            None => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

/// Where the token id lives in the `TokenMinted` log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenIdSlot {
    /// `topics[n]`; indexed parameters start at 1.
    Topic(usize),
    /// n-th 32-byte word of the non-indexed data.
    Data(usize),
}

impl FromStr for TokenIdSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, index) = s
            .split_once(':')
            .ok_or_else(|| format!("expected topic:N or data:N, got {s}"))?;
        let index: usize = index
            .trim()
            .parse()
            .map_err(|e| format!("invalid slot index in {s}: {e}"))?;
        match kind.trim() {
            "topic" if index == 0 => Err("topic:0 is the event signature".into()),
            "topic" => Ok(TokenIdSlot::Topic(index)),
            "data" => Ok(TokenIdSlot::Data(index)),
            other => Err(format!("unknown slot kind {other}")),
        }
    }
}

/// Address left-padded to a 32-byte word.
pub fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(&address.0);
    word
}

fn usize_word(value: usize) -> [u8; WORD] {
    TokenId::from(value as u128).0
}

/// Calldata for `mint(address)`.
pub fn encode_mint(to: &Address) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector(MINT_SIGNATURE));
    data.extend_from_slice(&address_word(to));
    data
}

/// Calldata for `setTokenURI(uint256,string)`.
pub fn encode_set_token_uri(token_id: &TokenId, uri: &str) -> Vec<u8> {
    let bytes = uri.as_bytes();
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut data = Vec::with_capacity(4 + 3 * WORD + padded);
    data.extend_from_slice(&selector(SET_TOKEN_URI_SIGNATURE));
    data.extend_from_slice(&token_id.0);
    // Head is two words, so the string tail starts at byte 64.
    data.extend_from_slice(&usize_word(2 * WORD));
    data.extend_from_slice(&usize_word(bytes.len()));
    data.extend_from_slice(bytes);
    data.resize(4 + 3 * WORD + padded, 0);
    data
}

/// `0x`-prefixed hex, as JSON-RPC expects.
pub fn to_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

pub fn from_hex(s: &str) -> Result<Vec<u8>, String> {
    let body = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(body).map_err(|e| format!("invalid hex {s}: {e}"))
}

/// Read the token id from a log's topics and data.
pub fn decode_token_id(
    slot: TokenIdSlot,
    topics: &[[u8; 32]],
    data: &[u8],
) -> Result<TokenId, String> {
    match slot {
        TokenIdSlot::Topic(n) => topics
            .get(n)
            .map(|t| TokenId(*t))
            .ok_or_else(|| format!("log has {} topics, token id expected at {n}", topics.len())),
        TokenIdSlot::Data(n) => {
            let start = n * WORD;
            let word = data
                .get(start..start + WORD)
                .ok_or_else(|| format!("log data is {} bytes, token id expected at word {n}", data.len()))?;
            let mut id = [0u8; 32];
            id.copy_from_slice(word);
            Ok(TokenId(id))
        }
    }
}
