use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Location;

use super::address::{location_from_reverse, ReversePlace};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// How a position request should be served. The provider enforces the
/// timeout itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub timeout: Duration,
    pub high_accuracy: bool,
    /// Oldest acceptable cached fix; zero means a fresh fix is required.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            high_accuracy: true,
            maximum_age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("geolocation unsupported")]
    Unsupported,
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timed out")]
    Timeout,
    #[error("unknown geolocation error")]
    Unknown,
}

impl LocateError {
    pub fn message(self) -> &'static str {
        match self {
            LocateError::Unsupported => "Geolocation is not supported on this device",
            LocateError::PermissionDenied => {
                "Location access denied. Please allow access to the location service."
            }
            LocateError::PositionUnavailable => "Location information unavailable",
            LocateError::Timeout => "Location request timed out",
            LocateError::Unknown => "An error occurred while getting location",
        }
    }
}

/// Why `locate` did not produce a location: either the device position
/// could not be read, or the coordinates could not be turned into a place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateFailure {
    #[error(transparent)]
    Position(#[from] LocateError),
    #[error("reverse geocoding failed")]
    ResolutionFailed,
}

impl LocateFailure {
    pub fn message(&self) -> &'static str {
        match self {
            LocateFailure::Position(e) => e.message(),
            LocateFailure::ResolutionFailed => "Failed to get location details",
        }
    }
}

#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> std::result::Result<Coordinates, LocateError>;
}

/// Coordinates pinned in the config file.
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl PositionProvider for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> std::result::Result<Coordinates, LocateError> {
        Ok(self.0)
    }
}

/// Used when geolocation is disabled.
pub struct NoProvider;

#[async_trait]
impl PositionProvider for NoProvider {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> std::result::Result<Coordinates, LocateError> {
        Err(LocateError::Unsupported)
    }
}

#[derive(Clone)]
pub struct GeoLocateClient {
    client: Client,
    reverse_url: Url,
    provider: Arc<dyn PositionProvider>,
    options: PositionOptions,
}

impl GeoLocateClient {
    pub fn new(client: Client, base_url: &str, provider: Arc<dyn PositionProvider>) -> Result<Self> {
        Ok(Self {
            client,
            reverse_url: super::endpoint(base_url, "reverse")?,
            provider,
            options: PositionOptions::default(),
        })
    }

    pub async fn locate(&self) -> std::result::Result<Location, LocateFailure> {
        let coords = self.provider.current_position(&self.options).await?;
        tracing::debug!("Device position {:.4}, {:.4}", coords.latitude, coords.longitude);

        self.reverse(coords).await.map_err(|e| {
            tracing::warn!("Reverse geocoding failed: {}", e);
            LocateFailure::ResolutionFailed
        })
    }

    async fn reverse(&self, coords: Coordinates) -> Result<Location> {
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();
        let response = self
            .client
            .get(self.reverse_url.clone())
            .query(&[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Geocoder(format!("reverse returned HTTP {}", response.status())));
        }

        let place: ReversePlace = response.json().await?;
        location_from_reverse(&place)
            .ok_or_else(|| AppError::Geocoder("reverse response has no address".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Failing(LocateError);

    #[async_trait]
    impl PositionProvider for Failing {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> std::result::Result<Coordinates, LocateError> {
            Err(self.0)
        }
    }

    const BERLIN: Coordinates = Coordinates {
        latitude: 52.52,
        longitude: 13.405,
    };

    fn client_for(server: &MockServer, provider: Arc<dyn PositionProvider>) -> GeoLocateClient {
        GeoLocateClient::new(Client::new(), &server.uri(), provider).unwrap()
    }

    #[test]
    fn default_options_match_browser_request() {
        let options = PositionOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert!(options.high_accuracy);
        assert_eq!(options.maximum_age, Duration::ZERO);
    }

    #[test]
    fn every_error_has_a_distinct_message() {
        let messages = [
            LocateError::Unsupported.message(),
            LocateError::PermissionDenied.message(),
            LocateError::PositionUnavailable.message(),
            LocateError::Timeout.message(),
            LocateError::Unknown.message(),
            LocateFailure::ResolutionFailed.message(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(LocateError::PermissionDenied.message().contains("denied"));
    }

    #[tokio::test]
    async fn coordinates_resolve_to_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("format", "json"))
            .and(query_param("lat", "52.52"))
            .and(query_param("lon", "13.405"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "address": {"city": "Berlin", "state": "Berlin", "country": "Germany"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let location = client_for(&server, Arc::new(FixedPosition(BERLIN)))
            .locate()
            .await
            .unwrap();
        assert_eq!(location.city, "Berlin");
        assert_eq!(location.country, "Germany");
    }

    #[tokio::test]
    async fn position_errors_skip_reverse_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server, Arc::new(Failing(LocateError::PermissionDenied)))
            .locate()
            .await
            .unwrap_err();
        assert_eq!(err, LocateFailure::Position(LocateError::PermissionDenied));

        let err = client_for(&server, Arc::new(NoProvider)).locate().await.unwrap_err();
        assert_eq!(err, LocateFailure::Position(LocateError::Unsupported));
    }

    #[tokio::test]
    async fn reverse_failure_is_resolution_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server, Arc::new(FixedPosition(BERLIN)))
            .locate()
            .await
            .unwrap_err();
        assert_eq!(err, LocateFailure::ResolutionFailed);
        assert_eq!(err.message(), "Failed to get location details");
    }
}
