//! Upstream selection and settings from global flags.

use anyhow::{Result, bail};
use std::sync::Arc;
use std::time::Duration;
use threadscope_extract::PostExtractor;
use threadscope_fetch::{
    BridgeClient, FetchContext, FetchSettings, FixtureClient, PlatformClient, RetryPolicy,
};
use tracing::debug;

use crate::Cli;

/// Builds settings from the global flags. Commands layer their own flags on top.
pub fn settings(cli: &Cli) -> FetchSettings {
    FetchSettings::default()
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_retry(RetryPolicy::new(cli.retries))
}

/// Opens the configured upstream: fixture replay or the HTTP bridge.
pub fn client(cli: &Cli, settings: &FetchSettings) -> Result<Arc<dyn PlatformClient>> {
    if let Some(dir) = &cli.fixtures {
        if !dir.is_dir() {
            bail!("fixture directory {} does not exist", dir.display());
        }
        debug!(dir = %dir.display(), "Replaying fixtures");
        return Ok(Arc::new(FixtureClient::new(dir.clone())));
    }

    if let Some(endpoint) = &cli.endpoint {
        let bridge = BridgeClient::with_options(endpoint, settings.timeout, settings.retry.clone())?;
        debug!(endpoint = %bridge.base_url(), "Using bridge");
        return Ok(Arc::new(bridge));
    }

    bail!("no upstream configured: pass --endpoint or --fixtures (or set THREADSCOPE_ENDPOINT)")
}

/// Validates the settings and builds an extractor over the configured upstream.
pub fn connect(cli: &Cli, settings: FetchSettings) -> Result<PostExtractor> {
    settings.validate()?;
    let client = client(cli, &settings)?;
    let ctx = FetchContext::new(client).with_settings(settings);
    Ok(PostExtractor::with_context(ctx))
}
