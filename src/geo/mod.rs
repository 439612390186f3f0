mod address;
mod gpsd;
mod locate;
mod search;

use std::sync::Arc;

use reqwest::Client;
use url::Url;

use crate::config::Config;
use crate::error::Result;

pub use gpsd::GpsdProvider;
pub use locate::{
    Coordinates, FixedPosition, GeoLocateClient, LocateError, LocateFailure, NoProvider,
    PositionOptions, PositionProvider,
};
pub use search::GeoSearchClient;

/// Resolve `name` under `base`, treating `base` as a directory even when it
/// lacks a trailing slash.
pub(crate) fn endpoint(base: &str, name: &str) -> Result<Url> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(name)?)
}

pub fn http_client(config: &Config) -> Result<Client> {
    Ok(Client::builder()
        .timeout(config.request_timeout())
        .connect_timeout(std::time::Duration::from_secs(10))
        .user_agent(config.user_agent.clone())
        .build()?)
}

/// Pick the position source described by the config.
pub fn position_provider(config: &Config) -> Arc<dyn PositionProvider> {
    let geo = &config.geolocation;
    if !geo.enabled {
        return Arc::new(NoProvider);
    }
    match (geo.latitude, geo.longitude) {
        (Some(latitude), Some(longitude)) => Arc::new(FixedPosition(Coordinates {
            latitude,
            longitude,
        })),
        _ => Arc::new(GpsdProvider::new(geo.gpsd_addr.clone())),
    }
}
