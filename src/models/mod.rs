mod location;
mod news;
mod reading;
mod time_range;
mod topic;

pub use location::{Location, SearchResultSet, SEARCH_LIMIT};
pub use news::{Article, GenerationRequest, GenerationResponse, GenerationStatus};
pub use reading::ReadingLength;
pub use time_range::{parse_entry_date, TimeRange, TimeRangeKind};
pub use topic::{catalog, filter_catalog, Topic, TopicSelection};
