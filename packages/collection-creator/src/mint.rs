//! Mint pipeline: one token per metadata URI, strictly one at a time.

use std::time::Instant;
use tracing::{info, warn};

use crate::abi::{self, Address, TokenId};
use crate::contract::{MintedEvent, TokenContract};
use crate::metrics::METRICS;
use crate::report::{MintOutcome, MintStage};

/// Mint a token for each URI and attach the URI to it.
///
/// Each image waits for its own confirmations before the next starts. A
/// failure is recorded and the loop moves on.
pub async fn mint_all<C: TokenContract>(
    contract: &C,
    event: &MintedEvent,
    metadata_uris: &[String],
) -> Vec<MintOutcome> {
    let to = contract.signer();
    let mut outcomes = Vec::with_capacity(metadata_uris.len());

    for (index, uri) in metadata_uris.iter().enumerate() {
        let start = Instant::now();
        let outcome = match mint_one(contract, event, &to, uri).await {
            Ok(token_id) => {
                info!(index, token_id = %token_id, uri = %uri, "Token minted");
                MintOutcome::Minted {
                    index,
                    token_id,
                    metadata_uri: uri.clone(),
                }
            }
            Err((stage, e)) => {
                warn!(index, uri = %uri, %stage, error = %e, "Mint failed, continuing");
                MintOutcome::Failed {
                    index,
                    metadata_uri: uri.clone(),
                    stage,
                    error: e.to_string(),
                }
            }
        };
        METRICS.record_mint(start, outcome.is_minted());
        outcomes.push(outcome);
    }

    outcomes
}

async fn mint_one<C: TokenContract>(
    contract: &C,
    event: &MintedEvent,
    to: &Address,
    uri: &str,
) -> Result<TokenId, (MintStage, crate::Error)> {
    let receipt = contract
        .mint(to)
        .await
        .map_err(|e| (MintStage::Mint, e))?;
    let token_id = event
        .token_id(&receipt)
        .map_err(|e| (MintStage::DecodeEvent, e))?;
    // A misconfigured slot reads the recipient word instead of the id.
    if token_id.0 == abi::address_word(to) {
        return Err((
            MintStage::DecodeEvent,
            crate::Error::Contract(format!(
                "TokenMinted slot holds the recipient {to}, not a token id; check token_id_slot"
            )),
        ));
    }
    contract
        .set_token_uri(&token_id, uri)
        .await
        .map_err(|e| (MintStage::SetTokenUri, e))?;
    Ok(token_id)
}
