//! Aggregate counts over a skill collection

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::skill::{Skill, SkillLevel};

/// Aggregate view of a skill collection.
///
/// Either derived locally by [`SummaryProjector`](crate::summary::SummaryProjector)
/// or fetched from `GET /skills/summary`; the two are never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of skills
    #[serde(default)]
    pub total_skills: usize,
    /// Count per exact category string
    #[serde(default)]
    pub by_category: BTreeMap<String, usize>,
    /// Count per level; levels with no skills are absent
    #[serde(default)]
    pub by_level: BTreeMap<SkillLevel, usize>,
    /// Most recently updated skills, newest first
    #[serde(default)]
    pub recently_updated: Vec<Skill>,
}

impl Summary {
    /// Category names, for a filter selector.
    pub fn categories(&self) -> Vec<&str> {
        self.by_category.keys().map(String::as_str).collect()
    }

    /// The `n` largest categories, count descending then name ascending.
    pub fn top_categories(&self, n: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .by_category
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }

    /// Number of skills at `level` (zero when absent).
    pub fn count_for_level(&self, level: SkillLevel) -> usize {
        self.by_level.get(&level).copied().unwrap_or(0)
    }
}
