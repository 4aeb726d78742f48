//! Result data model: image descriptors and the per-generation result set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single retrieved image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    /// Where the image bytes can be fetched from
    pub url: String,
    /// Human-readable description (alt text)
    pub description: String,
}

impl ImageResult {
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
        }
    }
}

/// Ordered images produced by one successful generation.
///
/// A result set is never appended to; a new generation replaces it wholesale.
/// An item's position is its index in `items`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Prompt that produced these results (empty for the initial set)
    pub prompt: String,

    /// Images in display order
    items: Vec<ImageResult>,

    /// When the generation settled (None for the initial set)
    pub generated_at: Option<DateTime<Utc>>,
}

impl ResultSet {
    /// The initial, empty result set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a result set for a settled generation
    pub fn new(prompt: impl Into<String>, items: Vec<ImageResult>) -> Self {
        Self {
            prompt: prompt.into(),
            items,
            generated_at: Some(Utc::now()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the image at a position
    pub fn get(&self, index: usize) -> Option<&ImageResult> {
        self.items.get(index)
    }

    /// Whether `index` is a valid position
    pub fn contains_index(&self, index: usize) -> bool {
        index < self.items.len()
    }

    pub fn first(&self) -> Option<&ImageResult> {
        self.items.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageResult> {
        self.items.iter()
    }
}

/// Status of the generation request cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl GenerationStatus {
    /// Whether a request is currently in flight
    pub fn is_loading(self) -> bool {
        self == GenerationStatus::Loading
    }
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GenerationStatus::Idle => "idle",
            GenerationStatus::Loading => "loading",
            GenerationStatus::Succeeded => "succeeded",
            GenerationStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_set() {
        let set = ResultSet::empty();
        assert!(set.is_empty());
        assert!(set.first().is_none());
        assert!(set.generated_at.is_none());
        assert!(!set.contains_index(0));
    }

    #[test]
    fn test_positions() {
        let set = ResultSet::new(
            "pets",
            vec![ImageResult::new("a", "cat"), ImageResult::new("b", "dog")],
        );
        assert_eq!(set.len(), 2);
        assert!(set.contains_index(1));
        assert!(!set.contains_index(2));
        assert_eq!(set.get(1).map(|i| i.description.as_str()), Some("dog"));
        assert!(set.generated_at.is_some());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&GenerationStatus::Succeeded).unwrap();
        assert_eq!(json, "\"succeeded\"");
    }
}
