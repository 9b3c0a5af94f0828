//! Last-country-wins bookkeeping for in-flight fetches.
//!
//! Every fetch is tagged with a generation and the country it targets.
//! Only the most recently issued tag may commit; anything older is stale,
//! however late it resolves.

/// Identity of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTag {
    /// Monotonic generation number
    pub generation: u64,
    /// Country code the fetch targets
    pub country: String,
}

/// Issues tags and judges which outcome is current.
#[derive(Debug, Default)]
pub struct RequestTracker {
    generation: u64,
    current: Option<RequestTag>,
}

impl RequestTracker {
    /// Create a tracker with nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch for `country`, superseding any earlier one.
    pub fn begin(&mut self, country: &str) -> RequestTag {
        self.generation += 1;
        let tag = RequestTag {
            generation: self.generation,
            country: country.to_string(),
        };
        self.current = Some(tag.clone());
        tag
    }

    /// True only for the latest tag that has not been completed yet.
    pub fn is_current(&self, tag: &RequestTag) -> bool {
        self.current.as_ref() == Some(tag)
    }

    /// Accept an outcome's tag. Returns false (and changes nothing) for stale tags.
    pub fn complete(&mut self, tag: &RequestTag) -> bool {
        if self.is_current(tag) {
            self.current = None;
            true
        } else {
            tracing::warn!(
                "Discarding stale result for '{}' (generation {}, latest {})",
                tag.country,
                tag.generation,
                self.generation
            );
            false
        }
    }

    /// Whether a fetch is outstanding.
    pub fn in_flight(&self) -> bool {
        self.current.is_some()
    }
}
