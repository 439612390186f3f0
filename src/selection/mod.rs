mod fields;
mod generation;
mod pickers;
mod resolver;

pub use fields::{Field, FieldState, FieldUpdate};
pub use generation::{GenerationCoordinator, TriggerOutcome};
pub use pickers::{step_reading, DateSlot, TimeRangePicker, TopicPicker};
pub use resolver::{LocationResolver, ResolutionState, SearchState};
