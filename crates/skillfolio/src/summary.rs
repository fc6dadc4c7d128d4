//! Summary Projector
//!
//! Derives a [`Summary`] from the held collection, or passes through the one
//! the server computed. Callers show one of the two; they are never merged.

use std::cmp::Reverse;

use crate::config::DEFAULT_RECENT_LIMIT;
use crate::types::{Skill, Summary};

/// Pure derivation of a [`Summary`] from a skill collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryProjector {
    recent_limit: usize,
}

impl Default for SummaryProjector {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT)
    }
}

impl SummaryProjector {
    /// Projector whose recently-updated list holds at most `recent_limit` skills.
    pub fn new(recent_limit: usize) -> Self {
        Self { recent_limit }
    }

    /// Bound on the recently-updated list.
    pub fn recent_limit(&self) -> usize {
        self.recent_limit
    }

    /// Summarize `skills`.
    ///
    /// Categories are grouped by their exact string. The recently-updated
    /// list is ordered newest first; equal timestamps keep collection order.
    pub fn project(&self, skills: &[Skill]) -> Summary {
        let mut summary = Summary {
            total_skills: skills.len(),
            ..Default::default()
        };

        for skill in skills {
            *summary
                .by_category
                .entry(skill.category.clone())
                .or_default() += 1;
            *summary.by_level.entry(skill.level).or_default() += 1;
        }

        let mut recent: Vec<&Skill> = skills.iter().collect();
        recent.sort_by_key(|skill| Reverse(skill.last_updated));
        summary.recently_updated = recent
            .into_iter()
            .take(self.recent_limit)
            .cloned()
            .collect();

        summary
    }
}

/// The one summary a board displays.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryView {
    /// Computed locally from the held collection
    Derived(Summary),
    /// Returned by the server, taken as authoritative
    Server(Summary),
}

impl SummaryView {
    /// The summary, whichever its source.
    pub fn summary(&self) -> &Summary {
        match self {
            SummaryView::Derived(summary) | SummaryView::Server(summary) => summary,
        }
    }

    /// Whether the server computed it.
    pub fn is_server(&self) -> bool {
        matches!(self, SummaryView::Server(_))
    }

    /// Take the summary out.
    pub fn into_summary(self) -> Summary {
        match self {
            SummaryView::Derived(summary) | SummaryView::Server(summary) => summary,
        }
    }
}
