use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub icon: String,
}

const CATALOG: &[(&str, &str, &str)] = &[
    ("general", "General News", "📰"),
    ("technology", "Technology", "💻"),
    ("ai", "Artificial Intelligence", "🤖"),
    ("business", "Business", "💼"),
    ("stocks", "Stock Market", "📈"),
    ("finance", "Finance", "💰"),
    ("politics", "Politics", "🏛"),
    ("world", "World News", "🌍"),
    ("science", "Science", "🔬"),
    ("health", "Health", "🏥"),
    ("sports", "Sports", "⚽"),
    ("entertainment", "Entertainment", "🎬"),
    ("crime", "Crime", "🚨"),
    ("education", "Education", "📚"),
    ("environment", "Environment", "🌱"),
    ("energy", "Energy", "⚡"),
    ("space", "Space", "🚀"),
    ("weather", "Weather", "🌤"),
    ("travel", "Travel", "✈"),
    ("food", "Food & Dining", "🍽"),
    ("lifestyle", "Lifestyle", "🌟"),
    ("automotive", "Automotive", "🚗"),
    ("real-estate", "Real Estate", "🏠"),
    ("cryptocurrency", "Cryptocurrency", "₿"),
    ("startups", "Startups", "🚀"),
];

const POPULAR_COUNT: usize = 6;

pub fn catalog() -> Vec<Topic> {
    CATALOG
        .iter()
        .map(|(id, name, icon)| Topic {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
        })
        .collect()
}

/// Selected topics keyed by id, in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct TopicSelection {
    topics: Vec<Topic>,
}

impl TopicSelection {
    /// Returns false if a topic with the same id is already selected.
    pub fn add(&mut self, topic: Topic) -> bool {
        if self.contains(&topic.id) {
            return false;
        }
        self.topics.push(topic);
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.topics.len();
        self.topics.retain(|t| t.id != id);
        self.topics.len() != before
    }

    pub fn pop(&mut self) -> Option<Topic> {
        self.topics.pop()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.topics.iter().any(|t| t.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn as_slice(&self) -> &[Topic] {
        &self.topics
    }
}

/// Catalog entries whose name contains `query`, ignoring case. With an
/// empty query and nothing selected yet, only the popular topics are
/// offered.
pub fn filter_catalog<'a>(
    catalog: &'a [Topic],
    query: &str,
    selection: &TopicSelection,
) -> Vec<&'a Topic> {
    let query = query.trim().to_lowercase();
    if query.is_empty() && selection.is_empty() {
        return catalog.iter().take(POPULAR_COUNT).collect();
    }
    catalog
        .iter()
        .filter(|t| t.name.to_lowercase().contains(&query))
        .collect()
}
