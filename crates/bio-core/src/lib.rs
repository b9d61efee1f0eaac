//! Bio Core - Domain models, errors, and shared types
//!
//! This crate defines the abstractions shared by the extraction pipeline:
//! - Article sections and their heading hierarchy
//! - Typed infobox records and the unknown sentinel
//! - Timeline events, activity periods, and turning points
//! - Entity frequency tables and person relations
//! - Common error types
//! - Configuration management

pub mod config;
pub mod record;

pub use config::{AppConfig, ConfigError};
pub use record::{
    AwardEntry, CanonicalField, ChildEntry, DateRecord, FieldValue, InfoboxRecord, Known,
    PeriodEntry, PlaceRecord, RawInfobox, UNKNOWN,
};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for extraction operations
#[derive(Error, Debug)]
pub enum BioError {
    /// A required upstream artifact (document, infobox) is absent
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BioError {
    /// Error raised when extraction runs before the page HTML was fetched
    pub fn content_not_fetched() -> Self {
        Self::MissingInput(
            "HTML content has not been fetched; fetch the page before extracting".to_string(),
        )
    }
}

pub type Result<T> = std::result::Result<T, BioError>;

// ============================================================================
// Sections
// ============================================================================

/// One heading (or untitled fragment) of an article body, flattened in reading order.
///
/// `category_texts` holds the ancestor heading texts only, so for a titled
/// section its length is always `heading_level - 2`. A section without
/// `heading_text` is either the lead paragraph block (level 2, empty path) or
/// an untitled fragment of the heading that ends its path. Fragments share
/// that heading's level, so levels stay within 2..=4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub category_texts: Vec<String>,
    pub heading_level: u8,
    pub heading_text: Option<String>,
    pub text: String,
}

impl Section {
    /// Create a section; the level is derived from the ancestor path
    pub fn new(
        category_texts: Vec<String>,
        heading_text: Option<String>,
        text: impl Into<String>,
    ) -> Self {
        let heading_level = u8::try_from(category_texts.len() + 2).unwrap_or(u8::MAX);
        Self {
            category_texts,
            heading_level,
            heading_text,
            text: text.into(),
        }
    }

    /// Untitled fragment of the heading at the end of `category_texts`,
    /// filed at that heading's level
    pub fn fragment(category_texts: Vec<String>, text: impl Into<String>) -> Self {
        let heading_level = u8::try_from(category_texts.len() + 1)
            .unwrap_or(u8::MAX)
            .max(2);
        Self {
            category_texts,
            heading_level,
            heading_text: None,
            text: text.into(),
        }
    }

    /// Nesting depth, 1 for a top-level heading
    pub fn depth(&self) -> usize {
        usize::from(self.heading_level.saturating_sub(1))
    }

    /// The heading this section is filed under: its own title, or for an
    /// untitled fragment the last ancestor on its path.
    pub fn nearest_heading(&self) -> Option<&str> {
        self.heading_text
            .as_deref()
            .or_else(|| self.category_texts.last().map(String::as_str))
    }

    /// Whether this is an untitled fragment or lead block
    pub fn is_untitled(&self) -> bool {
        self.heading_text.is_none()
    }
}

/// An image embedded in the article body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImage {
    pub src: String,
    pub alt: String,
}

// ============================================================================
// Timeline
// ============================================================================

/// Year component of a timeline event: an exact Gregorian year, or a coarse
/// label such as `19世紀` that has no single year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TimelineYear {
    Year(i32),
    Label(String),
}

/// Numbers and numeric strings (JSON map keys) read back as `Year`
impl<'de> Deserialize<'de> for TimelineYear {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct YearVisitor;

        impl serde::de::Visitor<'_> for YearVisitor {
            type Value = TimelineYear;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a year number or a year label")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                i32::try_from(v)
                    .map(TimelineYear::Year)
                    .map_err(|_| E::invalid_value(serde::de::Unexpected::Signed(v), &self))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                i32::try_from(v)
                    .map(TimelineYear::Year)
                    .map_err(|_| E::invalid_value(serde::de::Unexpected::Unsigned(v), &self))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                Ok(match v.parse::<i32>() {
                    Ok(year) => TimelineYear::Year(year),
                    Err(_) => TimelineYear::Label(v.to_string()),
                })
            }
        }

        deserializer.deserialize_any(YearVisitor)
    }
}

impl TimelineYear {
    /// The integer year, if this is not a coarse label
    pub fn as_year(&self) -> Option<i32> {
        match self {
            Self::Year(year) => Some(*year),
            Self::Label(_) => None,
        }
    }

    /// Approximate year used for ordering; a century sorts at its first year
    pub fn sort_year(&self) -> i32 {
        match self {
            Self::Year(year) => *year,
            Self::Label(label) => century_start(label).unwrap_or(i32::MAX),
        }
    }
}

fn century_start(label: &str) -> Option<i32> {
    let digits: String = label.chars().take_while(|c| c.is_ascii_digit()).collect();
    let century: i32 = digits.parse().ok()?;
    label[digits.len()..]
        .starts_with("世紀")
        .then(|| (century - 1) * 100 + 1)
}

impl Ord for TimelineYear {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_year()
            .cmp(&other.sort_year())
            .then_with(|| match (self, other) {
                (Self::Year(a), Self::Year(b)) => a.cmp(b),
                (Self::Year(_), Self::Label(_)) => Ordering::Less,
                (Self::Label(_), Self::Year(_)) => Ordering::Greater,
                (Self::Label(a), Self::Label(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for TimelineYear {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for TimelineYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{}", year),
            Self::Label(label) => write!(f, "{}", label),
        }
    }
}

/// A dated life event mined from the article body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub year: TimelineYear,
    /// Exact date as written (`1905年6月30日`), empty when only a year is known
    pub date: String,
    pub event: String,
}

impl TimelineEvent {
    pub fn new(year: TimelineYear, date: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            year,
            date: date.into(),
            event: event.into(),
        }
    }
}

/// A maximal span of active years, serialized as `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct ActivityPeriod {
    pub start: i32,
    pub end: i32,
}

impl ActivityPeriod {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }
}

impl From<(i32, i32)> for ActivityPeriod {
    fn from((start, end): (i32, i32)) -> Self {
        Self { start, end }
    }
}

impl From<ActivityPeriod> for (i32, i32) {
    fn from(period: ActivityPeriod) -> Self {
        (period.start, period.end)
    }
}

/// Turning point taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurningPointCategory {
    CareerChange,
    Success,
    Failure,
}

impl TurningPointCategory {
    /// Categories in the order they are checked
    pub const PRECEDENCE: [Self; 3] = [Self::CareerChange, Self::Success, Self::Failure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CareerChange => "career_change",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl std::fmt::Display for TurningPointCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurningPoint {
    pub year: TimelineYear,
    pub event: String,
    pub category: TurningPointCategory,
}

/// Derived views over a timeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineAnalysis {
    /// Number of events per year
    pub events_per_year: BTreeMap<TimelineYear, usize>,
    /// Events within the requested year range
    pub filtered_events: Vec<TimelineEvent>,
    pub activity_periods: Vec<ActivityPeriod>,
    pub turning_points: Vec<TurningPoint>,
    /// Script-run tokens of each year's events
    pub tokens_per_year: BTreeMap<TimelineYear, Vec<String>>,
}

impl TimelineAnalysis {
    pub fn is_empty(&self) -> bool {
        self.events_per_year.is_empty()
            && self.filtered_events.is_empty()
            && self.activity_periods.is_empty()
            && self.turning_points.is_empty()
    }
}

/// An accomplishment found in the article prose, with the subject's age at the time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub content: String,
    /// `1905年` or `26歳` as written
    pub period: String,
    pub age: Option<i32>,
}

// ============================================================================
// Entities and Relations
// ============================================================================

/// Named entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Person,
    Organization,
    Location,
    Date,
    Other,
}

impl EntityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Location => "location",
            Self::Date => "date",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Surface-form frequencies per entity category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityCounts {
    counts: BTreeMap<EntityCategory, BTreeMap<String, usize>>,
}

impl EntityCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `surface`
    pub fn increment(&mut self, category: EntityCategory, surface: impl Into<String>) {
        *self
            .counts
            .entry(category)
            .or_default()
            .entry(surface.into())
            .or_insert(0) += 1;
    }

    pub fn count(&self, category: EntityCategory, surface: &str) -> usize {
        self.counts
            .get(&category)
            .and_then(|table| table.get(surface))
            .copied()
            .unwrap_or(0)
    }

    pub fn category(&self, category: EntityCategory) -> Option<&BTreeMap<String, usize>> {
        self.counts.get(&category)
    }

    /// Person names ordered by descending frequency, then name
    pub fn persons_by_frequency(&self) -> Vec<(&str, usize)> {
        let mut persons: Vec<(&str, usize)> = self
            .counts
            .get(&EntityCategory::Person)
            .map(|table| table.iter().map(|(k, v)| (k.as_str(), *v)).collect())
            .unwrap_or_default();
        persons.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        persons
    }

    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|table| table.is_empty())
    }
}

/// Relation vocabulary for person-to-person edges
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationKind {
    Spouse,
    Mentor,
    Colleague,
    ParentChild,
    Unknown,
    /// Literal infobox label such as `配偶者` or `子供`
    Label(String),
}

impl RelationKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Spouse => "spouse",
            Self::Mentor => "mentor",
            Self::Colleague => "colleague",
            Self::ParentChild => "parent_child",
            Self::Unknown => "unknown",
            Self::Label(label) => label,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<String> for RelationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "spouse" => Self::Spouse,
            "mentor" => Self::Mentor,
            "colleague" => Self::Colleague,
            "parent_child" => Self::ParentChild,
            "unknown" => Self::Unknown,
            _ => Self::Label(value),
        }
    }
}

impl From<RelationKind> for String {
    fn from(kind: RelationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An undirected person-to-person relation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonRelation {
    pub source: String,
    pub target: String,
    pub relation: RelationKind,
}

impl PersonRelation {
    pub fn new(source: impl Into<String>, target: impl Into<String>, relation: RelationKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
