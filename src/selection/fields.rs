/// The four inputs that must be valid before news can be generated, in
/// the order they are reported when missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Location,
    Topics,
    TimeRange,
    ReadingTime,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Location => "Location",
            Field::Topics => "Topics",
            Field::TimeRange => "Time Range",
            Field::ReadingTime => "Reading Time",
        }
    }
}

/// Latest validity reported by one selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate {
    Location(bool),
    Topics(bool),
    TimeRange(bool),
    Reading(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldState {
    pub location_ok: bool,
    pub topics_ok: bool,
    pub time_range_ok: bool,
    pub reading_ok: bool,
}

impl FieldState {
    /// Initial state once the selectors exist: reading length has a
    /// default, everything else still needs input.
    pub fn mounted() -> Self {
        Self {
            reading_ok: true,
            ..Self::default()
        }
    }

    /// Fold one update in. Each update only touches its own field.
    #[must_use]
    pub fn apply(self, update: FieldUpdate) -> Self {
        match update {
            FieldUpdate::Location(ok) => Self {
                location_ok: ok,
                ..self
            },
            FieldUpdate::Topics(ok) => Self {
                topics_ok: ok,
                ..self
            },
            FieldUpdate::TimeRange(ok) => Self {
                time_range_ok: ok,
                ..self
            },
            FieldUpdate::Reading(ok) => Self {
                reading_ok: ok,
                ..self
            },
        }
    }

    pub fn from_updates(updates: impl IntoIterator<Item = FieldUpdate>) -> Self {
        updates.into_iter().fold(Self::mounted(), Self::apply)
    }

    pub fn all_ready(&self) -> bool {
        self.location_ok && self.topics_ok && self.time_range_ok && self.reading_ok
    }

    pub fn missing(&self) -> Vec<Field> {
        [
            (Field::Location, self.location_ok),
            (Field::Topics, self.topics_ok),
            (Field::TimeRange, self.time_range_ok),
            (Field::ReadingTime, self.reading_ok),
        ]
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(field, _)| field)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_ready_truth_table() {
        for bits in 0u8..16 {
            let state = FieldState {
                location_ok: bits & 1 != 0,
                topics_ok: bits & 2 != 0,
                time_range_ok: bits & 4 != 0,
                reading_ok: bits & 8 != 0,
            };
            assert_eq!(state.all_ready(), bits == 15, "combination {bits:04b}");
            assert_eq!(state.missing().is_empty(), bits == 15);
        }
    }

    #[test]
    fn mounted_has_only_reading_ok() {
        let state = FieldState::mounted();
        assert!(state.reading_ok);
        assert!(!state.location_ok && !state.topics_ok && !state.time_range_ok);
    }

    #[test]
    fn missing_fields_are_reported_in_fixed_order() {
        let state = FieldState::mounted().apply(FieldUpdate::Topics(true));
        let labels: Vec<_> = state.missing().into_iter().map(Field::label).collect();
        assert_eq!(labels, vec!["Location", "Time Range"]);

        let none = FieldState::default();
        let labels: Vec<_> = none.missing().into_iter().map(Field::label).collect();
        assert_eq!(labels, vec!["Location", "Topics", "Time Range", "Reading Time"]);
    }

    #[test]
    fn updates_are_last_write_wins_per_field() {
        let state = FieldState::from_updates([
            FieldUpdate::Location(true),
            FieldUpdate::Topics(true),
            FieldUpdate::Location(false),
            FieldUpdate::TimeRange(true),
            FieldUpdate::Location(true),
        ]);
        assert!(state.all_ready());

        let state = state.apply(FieldUpdate::Topics(false));
        assert!(state.location_ok && state.time_range_ok && state.reading_ok);
        assert!(!state.all_ready());
    }

    #[test]
    fn update_order_does_not_matter_across_fields() {
        let a = FieldState::from_updates([FieldUpdate::Location(true), FieldUpdate::TimeRange(true)]);
        let b = FieldState::from_updates([FieldUpdate::TimeRange(true), FieldUpdate::Location(true)]);
        assert_eq!(a, b);
    }
}
