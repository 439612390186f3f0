use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Location, SearchResultSet, SEARCH_LIMIT};

use super::address::{location_from_place, Place};

/// Free-text city search against a Nominatim-compatible geocoder.
#[derive(Clone)]
pub struct GeoSearchClient {
    client: Client,
    search_url: Url,
}

impl GeoSearchClient {
    pub fn new(client: Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            search_url: super::endpoint(base_url, "search")?,
        })
    }

    /// Never fails: blank queries and upstream errors both give an empty
    /// set, with the error logged.
    pub async fn search(&self, query: &str) -> SearchResultSet {
        let query = query.trim();
        if query.is_empty() {
            return SearchResultSet::empty();
        }

        match self.fetch(query).await {
            Ok(locations) => {
                tracing::debug!("Search for {:?} returned {} locations", query, locations.len());
                SearchResultSet::from_locations(locations)
            }
            Err(e) => {
                tracing::debug!("Search for {:?} failed: {}", query, e);
                SearchResultSet::empty()
            }
        }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Location>> {
        let limit = SEARCH_LIMIT.to_string();
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", limit.as_str()),
                ("featuretype", "city"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Geocoder(format!("search returned HTTP {}", response.status())));
        }

        let places: Vec<Place> = response.json().await?;
        Ok(places.iter().filter_map(location_from_place).collect())
    }
}
