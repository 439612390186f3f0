use chrono::NaiveDate;

use crate::models::{
    filter_catalog, parse_entry_date, ReadingLength, TimeRange, TimeRangeKind, Topic,
    TopicSelection,
};

/// Topic search box plus the current selection.
pub struct TopicPicker {
    catalog: Vec<Topic>,
    query: String,
    highlighted: usize,
    selection: TopicSelection,
}

impl TopicPicker {
    pub fn new(catalog: Vec<Topic>) -> Self {
        Self {
            catalog,
            query: String::new(),
            highlighted: 0,
            selection: TopicSelection::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn selection(&self) -> &TopicSelection {
        &self.selection
    }

    pub fn candidates(&self) -> Vec<&Topic> {
        filter_catalog(&self.catalog, &self.query, &self.selection)
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.highlighted = 0;
    }

    /// Edits the query, or drops the most recent topic when the query is
    /// already empty.
    pub fn backspace(&mut self) {
        if self.query.pop().is_none() {
            self.selection.pop();
        }
        self.highlighted = 0;
    }

    pub fn move_highlight(&mut self, delta: isize) {
        let len = self.candidates().len();
        if len == 0 {
            return;
        }
        self.highlighted = self.highlighted.saturating_add_signed(delta).min(len - 1);
    }

    pub fn add_highlighted(&mut self) -> bool {
        let Some(topic) = self.candidates().get(self.highlighted).map(|t| (*t).clone()) else {
            return false;
        };
        let added = self.selection.add(topic);
        self.query.clear();
        self.highlighted = 0;
        added
    }

    /// Deselect the highlighted candidate if it is currently selected.
    pub fn remove_highlighted(&mut self) -> bool {
        let Some(id) = self.candidates().get(self.highlighted).map(|t| t.id.clone()) else {
            return false;
        };
        self.selection.remove(&id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSlot {
    #[default]
    Start,
    End,
}

/// Range list plus the custom date entry line.
#[derive(Default)]
pub struct TimeRangePicker {
    range: TimeRange,
    date_input: String,
    slot: DateSlot,
    date_error: Option<String>,
}

impl TimeRangePicker {
    pub fn range(&self) -> &TimeRange {
        &self.range
    }

    pub fn date_input(&self) -> &str {
        &self.date_input
    }

    pub fn slot(&self) -> DateSlot {
        self.slot
    }

    pub fn date_error(&self) -> Option<&str> {
        self.date_error.as_deref()
    }

    pub fn is_custom(&self) -> bool {
        self.range.kind == TimeRangeKind::Custom
    }

    /// Step through the preset list. Custom dates survive switching away
    /// and back.
    pub fn move_selection(&mut self, delta: isize) {
        let kinds = TimeRangeKind::ALL;
        let current = kinds.iter().position(|k| *k == self.range.kind).unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(kinds.len() - 1);
        self.range.kind = kinds[next];
        self.date_error = None;
    }

    pub fn push_char(&mut self, c: char) {
        if self.is_custom() && (c.is_ascii_digit() || c == '-') && self.date_input.len() < 10 {
            self.date_input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.date_input.pop();
    }

    /// Commit the typed date into the active slot and move to the other
    /// one.
    pub fn confirm_date(&mut self, today: NaiveDate) -> bool {
        if !self.is_custom() {
            return false;
        }
        let Some(date) = parse_entry_date(&self.date_input, today) else {
            self.date_error = Some(format!("Enter a date as YYYY-MM-DD, no later than {today}"));
            return false;
        };

        match self.slot {
            DateSlot::Start => {
                self.range.start_date = Some(date);
                self.slot = DateSlot::End;
            }
            DateSlot::End => {
                self.range.end_date = Some(date);
                self.slot = DateSlot::Start;
            }
        }
        self.date_input.clear();
        self.date_error = None;
        true
    }
}

pub fn step_reading(current: ReadingLength, delta: isize) -> ReadingLength {
    let all = ReadingLength::ALL;
    let index = all.iter().position(|r| *r == current).unwrap_or(0);
    all[index.saturating_add_signed(delta).min(all.len() - 1)]
}
