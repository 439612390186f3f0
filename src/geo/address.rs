use serde::Deserialize;

use crate::models::Location;

/// One record of a Nominatim `search` response. Only the fields we read
/// are modelled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub address: Option<Address>,
}

/// Body of a Nominatim `reverse` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReversePlace {
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl Address {
    fn city_like(&self) -> Option<&str> {
        first_present([&self.city, &self.town, &self.village])
    }

    fn state_like(&self) -> Option<&str> {
        first_present([&self.state, &self.region])
    }
}

fn first_present<const N: usize>(fields: [&Option<String>; N]) -> Option<&str> {
    fields
        .into_iter()
        .filter_map(|f| f.as_deref())
        .find(|s| !s.is_empty())
}

/// Normalize a search hit. Records without a city, town or village are
/// dropped.
pub fn location_from_place(place: &Place) -> Option<Location> {
    let address = place.address.as_ref()?;
    let city = address.city_like()?;

    Some(Location {
        city: city.to_string(),
        state: address.state_like().unwrap_or_default().to_string(),
        country: address.country.clone().unwrap_or_default(),
    })
}

/// Normalize a reverse lookup. Missing city or country become "Unknown";
/// `None` only when the response has no address at all.
pub fn location_from_reverse(place: &ReversePlace) -> Option<Location> {
    let address = place.address.as_ref()?;

    Some(Location {
        city: address.city_like().unwrap_or("Unknown").to_string(),
        state: address.state_like().unwrap_or_default().to_string(),
        country: address
            .country
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or("Unknown")
            .to_string(),
    })
}
