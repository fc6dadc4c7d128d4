//! Filter Engine
//!
//! Narrows the held collection to what the user asked to see, without
//! calling the server and without touching the collection.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::{Skill, SkillLevel};

/// Which attribute the filter value applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Everything; the value is ignored
    #[default]
    All,
    /// Exact category match
    Category,
    /// Level ordinal match
    Level,
}

impl FilterMode {
    /// Lowercase name used on the wire and in selectors.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Category => "category",
            FilterMode::Level => "level",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "category" => Ok(FilterMode::Category),
            "level" => Ok(FilterMode::Level),
            other => Err(Error::InvalidRequest(format!("unknown filter mode '{other}'"))),
        }
    }
}

/// Filter selection as the UI holds it: a mode plus a free-text value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Selected mode
    pub mode: FilterMode,
    /// Category name or level ordinal, depending on `mode`
    pub value: String,
}

impl FilterState {
    /// Create a filter state.
    pub fn new(mode: FilterMode, value: impl Into<String>) -> Self {
        Self {
            mode,
            value: value.into(),
        }
    }

    /// Switch mode. The value is cleared when the mode actually changes.
    pub fn with_mode(mut self, mode: FilterMode) -> Self {
        if self.mode != mode {
            self.mode = mode;
            self.value.clear();
        }
        self
    }

    /// Replace the value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Tagged form of this selection.
    ///
    /// A level value that is not an integer naming a level parses to
    /// `Level(None)`, which matches nothing.
    pub fn parse(&self) -> Filter {
        match self.mode {
            FilterMode::All => Filter::All,
            FilterMode::Category => Filter::Category(self.value.clone()),
            FilterMode::Level => Filter::Level(
                self.value
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(SkillLevel::from_ordinal),
            ),
        }
    }
}

/// Parsed filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every skill
    All,
    /// Skills whose category equals this string exactly; empty matches nothing
    Category(String),
    /// Skills at this level; `None` matches nothing
    Level(Option<SkillLevel>),
}

impl Filter {
    /// Whether `skill` passes.
    pub fn matches(&self, skill: &Skill) -> bool {
        match self {
            Filter::All => true,
            Filter::Category(category) => !category.is_empty() && skill.category == *category,
            Filter::Level(level) => level.is_some_and(|level| skill.level == level),
        }
    }
}

impl From<&FilterState> for Filter {
    fn from(state: &FilterState) -> Self {
        state.parse()
    }
}

/// The skills from `skills` that pass `filter`, in collection order.
pub fn apply<'a>(skills: &'a [Skill], filter: &Filter) -> Vec<&'a Skill> {
    skills.iter().filter(|skill| filter.matches(skill)).collect()
}
