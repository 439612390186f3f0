use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound on results the geocoder is asked for, and therefore on the
/// size of any [`SearchResultSet`].
pub const SEARCH_LIMIT: usize = 20;

/// A canonical place record. Equality is exact on all three fields, as
/// returned by the geocoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Location {
    /// "State, Country" or just "Country" when the state is empty.
    pub fn region_line(&self) -> String {
        if self.state.is_empty() {
            self.country.clone()
        } else {
            format!("{}, {}", self.state, self.country)
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.region_line())
    }
}

/// Ordered, duplicate-free list of search hits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResultSet {
    locations: Vec<Location>,
}

impl SearchResultSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_locations(locations: Vec<Location>) -> Self {
        let mut locations = dedupe(locations);
        locations.truncate(SEARCH_LIMIT);
        Self { locations }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Location> {
        self.locations.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }
}

/// Collapse identical (city, state, country) triples, keeping the first
/// occurrence of each in its original position.
pub fn dedupe(locations: Vec<Location>) -> Vec<Location> {
    let mut seen = HashSet::with_capacity(locations.len());
    locations
        .into_iter()
        .filter(|location| seen.insert(location.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(city: &str, state: &str, country: &str) -> Location {
        Location {
            city: city.to_string(),
            state: state.to_string(),
            country: country.to_string(),
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence_order() {
        let input = vec![
            loc("London", "", "United Kingdom"),
            loc("London", "Ontario", "Canada"),
            loc("London", "", "United Kingdom"),
            loc("Londonderry", "", "United Kingdom"),
        ];

        let out = dedupe(input);
        assert_eq!(
            out,
            vec![
                loc("London", "", "United Kingdom"),
                loc("London", "Ontario", "Canada"),
                loc("Londonderry", "", "United Kingdom"),
            ]
        );
    }

    #[test]
    fn dedupe_is_idempotent_and_never_grows() {
        let samples = vec![
            vec![],
            vec![loc("Paris", "", "France")],
            vec![
                loc("Paris", "", "France"),
                loc("Paris", "Texas", "United States"),
                loc("Paris", "", "France"),
                loc("paris", "", "France"),
            ],
            vec![loc("A", "B", "C"); 5],
        ];

        for sample in samples {
            let distinct: HashSet<_> = sample.iter().cloned().collect();
            let once = dedupe(sample.clone());
            let twice = dedupe(once.clone());
            assert_eq!(once, twice, "dedupe must be idempotent");
            assert_eq!(once.len(), distinct.len());
            assert!(once.len() <= sample.len());
        }
    }

    #[test]
    fn equality_is_case_sensitive() {
        assert_ne!(loc("paris", "", "France"), loc("Paris", "", "France"));
    }

    #[test]
    fn result_set_is_capped() {
        let many = (0..30)
            .map(|i| loc(&format!("Town {i}"), "", "Nowhere"))
            .collect();
        let set = SearchResultSet::from_locations(many);
        assert_eq!(set.len(), SEARCH_LIMIT);
        assert_eq!(set.get(0).map(|l| l.city.as_str()), Some("Town 0"));
    }

    #[test]
    fn display_omits_empty_state() {
        assert_eq!(
            loc("London", "", "United Kingdom").to_string(),
            "London, United Kingdom"
        );
        assert_eq!(
            loc("Austin", "Texas", "United States").to_string(),
            "Austin, Texas, United States"
        );
    }
}
