//! Skill records and the payloads used to create or change them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{Error, Result};
use crate::observability::log_validation_error;

/// Server-assigned skill identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub i64);

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SkillId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Self-assessed proficiency.
///
/// On the wire a level is its ordinal (`1`, `2`, `3`), both as a value and
/// as a map key. Level names are accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkillLevel {
    /// Ordinal 1
    Beginner = 1,
    /// Ordinal 2
    Intermediate = 2,
    /// Ordinal 3
    Expert = 3,
}

impl SkillLevel {
    /// All levels in ordinal order.
    pub const ALL: [SkillLevel; 3] = [
        SkillLevel::Beginner,
        SkillLevel::Intermediate,
        SkillLevel::Expert,
    ];

    /// Level for an ordinal, if it names one.
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            1 => Some(SkillLevel::Beginner),
            2 => Some(SkillLevel::Intermediate),
            3 => Some(SkillLevel::Expert),
            _ => None,
        }
    }

    /// Wire ordinal.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Display name, matching the server's `levelName`.
    pub fn name(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Expert => "Expert",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SkillLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.ordinal())
    }
}

impl<'de> Deserialize<'de> for SkillLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct LevelVisitor;

        impl serde::de::Visitor<'_> for LevelVisitor {
            type Value = SkillLevel;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a skill level ordinal 1-3 or level name")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<SkillLevel, E> {
                SkillLevel::from_ordinal(v)
                    .ok_or_else(|| E::custom(format!("unknown skill level {v}")))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<SkillLevel, E> {
                let ordinal = i64::try_from(v).unwrap_or(i64::MAX);
                self.visit_i64(ordinal)
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<SkillLevel, E> {
                match v.trim().parse::<i64>() {
                    Ok(ordinal) => self.visit_i64(ordinal),
                    Err(_) => SkillLevel::from_name(v.trim())
                        .ok_or_else(|| E::custom(format!("unknown skill level '{v}'"))),
                }
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}

/// Canonical skill record as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    /// Server-assigned id, unique within the collection
    pub id: SkillId,
    /// Skill name
    pub name: String,
    /// Free-form category, compared exactly
    pub category: String,
    /// Optional notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Proficiency level
    pub level: SkillLevel,
    /// Server-rendered level name
    #[serde(default)]
    pub level_name: String,
    /// Creation time
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last modification time
    #[serde(with = "timestamp")]
    pub last_updated: DateTime<Utc>,
}

/// Payload for creating a skill, also the content of an edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDraft {
    /// Skill name (required)
    pub name: String,
    /// Category (required)
    pub category: String,
    /// Optional notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Proficiency level
    pub level: SkillLevel,
}

impl SkillDraft {
    /// Create a draft with no description.
    pub fn new(name: impl Into<String>, category: impl Into<String>, level: SkillLevel) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            description: None,
            level,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the fields a create call requires.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `name` or `category` is blank.
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("category", &self.category)
    }
}

impl From<&Skill> for SkillDraft {
    fn from(skill: &Skill) -> Self {
        Self {
            name: skill.name.clone(),
            category: skill.category.clone(),
            description: skill.description.clone(),
            level: skill.level,
        }
    }
}

/// Partial update; only the fields that are set are sent and overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillPatch {
    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<SkillLevel>,
}

impl SkillPatch {
    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the level.
    pub fn level(mut self, level: SkillLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.level.is_none()
    }

    /// Check the fields that are set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for an empty patch or a blank
    /// `name`/`category`.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidRequest("update has no fields".to_string()));
        }
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(category) = &self.category {
            require_text("category", category)?;
        }
        Ok(())
    }
}

impl From<SkillDraft> for SkillPatch {
    fn from(draft: SkillDraft) -> Self {
        Self {
            name: Some(draft.name),
            category: Some(draft.category),
            description: draft.description,
            level: Some(draft.level),
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        log_validation_error(field, "must not be empty");
        return Err(Error::InvalidRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Timestamps are written as RFC 3339. When reading, an offset-less
/// timestamp (`2025-01-31T10:00:00.123`) is taken as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }
}
