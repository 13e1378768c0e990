//! Tag filter for the grid view. Scroll and arcade always show everything.

use std::fmt;

use crate::models::Item;

/// Name of the catch-all filter.
pub const ALL_TAG: &str = "all";

/// Active tag filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl TagFilter {
    /// `"all"` maps to [`TagFilter::All`]; any other value is a tag, known or not.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == ALL_TAG {
            Self::All
        } else {
            Self::Tag(trimmed.to_string())
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Self::All => true,
            Self::Tag(tag) => item.has_tag(tag),
        }
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_TAG),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

/// Grid subset produced by a filter. An empty subset is a valid state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredSubset {
    pub filter: TagFilter,
    pub items: Vec<Item>,
}

impl FilteredSubset {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Holds the active tag and derives the grid subset from the master list.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    active: TagFilter,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &TagFilter {
        &self.active
    }

    /// Make `tag` the active filter and return the matching subset.
    pub fn set_filter(&mut self, tag: &str, master: &[Item]) -> FilteredSubset {
        self.active = TagFilter::parse(tag);
        self.subset(master)
    }

    /// Subset of `master` matching the active filter, in master order.
    pub fn subset(&self, master: &[Item]) -> FilteredSubset {
        FilteredSubset {
            filter: self.active.clone(),
            items: master
                .iter()
                .filter(|item| self.active.matches(item))
                .cloned()
                .collect(),
        }
    }

    /// Advance to the next option of `["all", tags...]`, wrapping around.
    pub fn cycle(&mut self, tags: &[String], master: &[Item]) -> FilteredSubset {
        let next = match &self.active {
            TagFilter::All => tags.first().cloned(),
            TagFilter::Tag(current) => tags
                .iter()
                .position(|tag| tag == current)
                .and_then(|position| tags.get(position + 1).cloned()),
        };
        let next = next.unwrap_or_else(|| ALL_TAG.to_string());
        self.set_filter(&next, master)
    }
}
