use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRangeKind {
    LastHour,
    #[default]
    Last24h,
    LastWeek,
    LastMonth,
    Custom,
}

impl TimeRangeKind {
    pub const ALL: [TimeRangeKind; 5] = [
        TimeRangeKind::LastHour,
        TimeRangeKind::Last24h,
        TimeRangeKind::LastWeek,
        TimeRangeKind::LastMonth,
        TimeRangeKind::Custom,
    ];

    pub fn id(self) -> &'static str {
        match self {
            TimeRangeKind::LastHour => "1h",
            TimeRangeKind::Last24h => "24h",
            TimeRangeKind::LastWeek => "7d",
            TimeRangeKind::LastMonth => "30d",
            TimeRangeKind::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRangeKind::LastHour => "Last Hour",
            TimeRangeKind::Last24h => "Last 24 Hours",
            TimeRangeKind::LastWeek => "Last Week",
            TimeRangeKind::LastMonth => "Last Month",
            TimeRangeKind::Custom => "Custom Range",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TimeRangeKind::LastHour => "Breaking news",
            TimeRangeKind::Last24h => "Today's news",
            TimeRangeKind::LastWeek => "Weekly roundup",
            TimeRangeKind::LastMonth => "Monthly digest",
            TimeRangeKind::Custom => "Choose dates",
        }
    }
}

/// The chosen range. Custom dates stay optional until the user has filled
/// both of them in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeRange {
    pub kind: TimeRangeKind,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TimeRange {
    pub fn is_complete(&self) -> bool {
        self.kind != TimeRangeKind::Custom
            || (self.start_date.is_some() && self.end_date.is_some())
    }

    pub fn summary(&self) -> String {
        match (self.kind, self.start_date, self.end_date) {
            (TimeRangeKind::Custom, Some(start), Some(end)) => {
                format!("Custom: {start} to {end}")
            }
            (kind, _, _) => format!("Showing news from: {}", kind.label().to_lowercase()),
        }
    }
}

impl Serialize for TimeRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let custom = self.kind == TimeRangeKind::Custom;
        let len = if custom { 6 } else { 4 };
        let mut state = serializer.serialize_struct("TimeRange", len)?;
        state.serialize_field("id", self.kind.id())?;
        state.serialize_field("label", self.kind.label())?;
        state.serialize_field("value", self.kind.id())?;
        state.serialize_field("description", self.kind.description())?;
        if custom {
            state.serialize_field("startDate", &self.start_date)?;
            state.serialize_field("endDate", &self.end_date)?;
        }
        state.end()
    }
}

/// Parse a `YYYY-MM-DD` date entered by the user. Dates after `today` are
/// rejected.
pub fn parse_entry_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()?;
    (date <= today).then_some(date)
}
