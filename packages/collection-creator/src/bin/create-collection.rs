//! Collection creator binary.

use collection_creator::metrics::METRICS;
use collection_creator::rpc::RpcClient;
use collection_creator::selection::expand_paths;
use collection_creator::{
    CollectionFlow, Config, DropPolicy, EvmContract, MintOutcome, MintedEvent, Minting,
    Notification, PinataClient,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args().nth(1);
    let config = match Config::load(config_path.as_deref()).and_then(|c| {
        c.validate()?;
        Ok(c)
    }) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "FATAL: fix collection.toml or CREATOR_* env vars");
            return ExitCode::FAILURE;
        }
    };

    info!(
        pinata = %config.pinata_api_url,
        rpc = %config.rpc_url,
        contract = %config.contract_address,
        mint = config.mint_enabled,
        "Configuration loaded"
    );

    let notification = run(config)
        .await
        .unwrap_or_else(|e| Notification::failed(&e));
    let code = match &notification {
        Notification::Success => {
            info!("{notification}");
            ExitCode::SUCCESS
        }
        Notification::PartialFailure { .. } => {
            warn!("{notification}");
            ExitCode::from(2)
        }
        Notification::Failed { .. } => {
            error!("{notification}");
            ExitCode::FAILURE
        }
    };
    info!(summary = %METRICS.summary(), "Run finished");
    code
}

async fn run(config: Config) -> Result<Notification, collection_creator::Error> {
    let pinner = Arc::new(PinataClient::new(
        &config.pinata_api_url,
        &config.pinata_jwt,
        config.http_timeout(),
    )?);

    let minting = if config.mint_enabled {
        let address = config.contract_address()?;
        let rpc = RpcClient::new(
            &config.rpc_url,
            config.fallback_rpc_url.as_deref(),
            config.http_timeout(),
        )?;
        let contract = EvmContract::connect(
            rpc,
            address,
            config.from_address()?,
            config.receipt_poll_interval(),
            config.receipt_timeout(),
        )
        .await?;
        let event = MintedEvent::new(address, &config.token_minted_event, config.token_id_slot()?);
        Some(Minting { contract, event })
    } else {
        None
    };

    let mut flow = CollectionFlow::new(pinner, minting);
    flow.set_form(config.collection.form());

    let paths = expand_paths(&config.collection.images).await?;
    let dropped = DropPolicy::new(config.max_file_bytes).drop_files(&paths).await?;
    for rejected in &dropped.rejected {
        warn!(path = %rejected.path.display(), reason = %rejected.reason, "Skipping file");
    }
    flow.drop_files(dropped);

    let report = flow.submit().await?;

    info!(uri = %report.manifest.collection_uri, "Collection metadata");
    let pinned = report
        .manifest
        .image_uris
        .iter()
        .zip(&report.manifest.metadata_uris);
    for (index, (image, metadata)) in pinned.enumerate() {
        info!(item = index + 1, image = %image, metadata = %metadata, "Pinned");
    }
    for outcome in &report.mints {
        if let MintOutcome::Failed { index, stage, error, .. } = outcome {
            warn!(item = index + 1, %stage, error = %error, "Not minted");
        }
    }

    Ok(report.notification())
}
