use crate::{Config, ForecastPoint, client::stormglass::StormGlassClient};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod stormglass;

/// Abstraction over point-forecast backends.
///
/// Implementations issue exactly one outbound request per call and hold no
/// mutable state across calls, so a single instance is safe to share
/// between concurrent call sites.
#[async_trait]
pub trait ForecastClient: Send + Sync + Debug {
    /// Fetch the normalized forecast for a coordinate pair.
    ///
    /// An empty vector is a valid outcome: it means the provider answered
    /// but no sample was usable.
    async fn fetch_points(&self, lat: f64, lng: f64) -> anyhow::Result<Vec<ForecastPoint>>;
}

/// Construct the forecast client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastClient>> {
    let token = config.api_token().filter(|t| !t.is_empty()).ok_or_else(|| {
        anyhow::anyhow!(
            "No StormGlass API token configured.\n\
             Hint: run `surfcast configure` and enter your API token."
        )
    })?;

    Ok(Box::new(StormGlassClient::new(
        config.api_url.clone(),
        token.to_owned(),
        config.source.clone(),
    )))
}
