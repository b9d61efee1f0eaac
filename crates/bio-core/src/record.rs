//! Typed infobox record
//!
//! Canonical fields carry a strongly typed payload. Values that fail to
//! parse are represented with the [`UNKNOWN`] sentinel rather than omitted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Sentinel for values that could not be determined
pub const UNKNOWN: &str = "不明";

// ============================================================================
// Sentinel values
// ============================================================================

/// A value that is either known or the unknown sentinel.
///
/// Serializes as the bare value, or as the string `不明`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Known<T> {
    Value(T),
    #[default]
    Unknown,
}

impl<T> Known<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl<T: Copy> Known<T> {
    pub fn get(&self) -> Option<T> {
        self.value().copied()
    }
}

impl<T> From<Option<T>> for Known<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unknown, Self::Value)
    }
}

impl<T: Serialize> Serialize for Known<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::Unknown => serializer.serialize_str(UNKNOWN),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Known<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        if raw.as_str() == Some(UNKNOWN) {
            return Ok(Self::Unknown);
        }
        Ok(serde_json::from_value(raw).map_or(Self::Unknown, Self::Value))
    }
}

// ============================================================================
// Structured payloads
// ============================================================================

/// A calendar date; every sub-key is always present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRecord {
    pub year: Known<i32>,
    pub month: Known<u32>,
    pub day: Known<u32>,
    /// `YYYY-MM-DD`, or the sentinel
    pub full: String,
}

impl DateRecord {
    pub fn unknown() -> Self {
        Self {
            year: Known::Unknown,
            month: Known::Unknown,
            day: Known::Unknown,
            full: UNKNOWN.to_string(),
        }
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Self {
        Self {
            year: Known::Value(year),
            month: Known::Value(month),
            day: Known::Value(day),
            full: format!("{:04}-{:02}-{:02}", year, month, day),
        }
    }

    pub fn ymd(&self) -> Option<(i32, u32, u32)> {
        Some((self.year.get()?, self.month.get()?, self.day.get()?))
    }

    pub fn is_known(&self) -> bool {
        self.ymd().is_some()
    }
}

impl Default for DateRecord {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Birthplace split into country, state or kingdom, and city
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub raw: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
}

/// Names held over a year range (nationality, affiliation, spouse)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodEntry {
    pub names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end: Option<i32>,
}

impl PeriodEntry {
    pub fn names_only(names: Vec<String>) -> Self {
        Self {
            names,
            start: None,
            end: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    pub name: Option<String>,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    /// Death year was written with a trailing `?`
    pub death_year_uncertain: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardEntry {
    pub award: String,
    pub year: i32,
}

/// Typed value of a canonical infobox field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Date(DateRecord),
    Place(PlaceRecord),
    Periods(Vec<PeriodEntry>),
    Children(Vec<ChildEntry>),
    Awards(Vec<AwardEntry>),
    Age(Known<i32>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateRecord> {
        match self {
            Self::Date(date) => Some(date),
            _ => None,
        }
    }

    /// Person names mentioned by this value, used for relation edges
    pub fn person_names(&self) -> Vec<String> {
        match self {
            Self::Text(text) => vec![text.clone()],
            Self::List(items) => items.clone(),
            Self::Periods(entries) => entries.iter().flat_map(|e| e.names.clone()).collect(),
            Self::Children(children) => children.iter().filter_map(|c| c.name.clone()).collect(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Canonical fields
// ============================================================================

/// Canonical infobox fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Name,
    FullName,
    BirthDate,
    DeathDate,
    AgeAtDeath,
    BirthPlace,
    Nationality,
    Ethnicity,
    Residence,
    Education,
    Occupation,
    Affiliation,
    Institutions,
    Field,
    FieldCategory,
    DoctoralThesis,
    DoctoralAdvisor,
    OtherAdvisors,
    NotableWorks,
    Influenced,
    InfluencedBy,
    Awards,
    ActivePeriods,
    HonorificTitle,
    Religion,
    Ideology,
    Spouse,
    Children,
    Parents,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::FullName => "full_name",
            Self::BirthDate => "birth_date",
            Self::DeathDate => "death_date",
            Self::AgeAtDeath => "age_at_death",
            Self::BirthPlace => "birth_place",
            Self::Nationality => "nationality",
            Self::Ethnicity => "ethnicity",
            Self::Residence => "residence",
            Self::Education => "education",
            Self::Occupation => "occupation",
            Self::Affiliation => "affiliation",
            Self::Institutions => "institutions",
            Self::Field => "field",
            Self::FieldCategory => "field_category",
            Self::DoctoralThesis => "doctoral_thesis",
            Self::DoctoralAdvisor => "doctoral_advisor",
            Self::OtherAdvisors => "other_advisors",
            Self::NotableWorks => "notable_works",
            Self::Influenced => "influenced",
            Self::InfluencedBy => "influenced_by",
            Self::Awards => "awards",
            Self::ActivePeriods => "active_periods",
            Self::HonorificTitle => "honorific_title",
            Self::Religion => "religion",
            Self::Ideology => "ideology",
            Self::Spouse => "spouse",
            Self::Children => "children",
            Self::Parents => "parents",
        }
    }

    /// Japanese infobox label used as the relation label for family edges
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "氏名",
            Self::FullName => "本名",
            Self::BirthDate => "生年月日",
            Self::DeathDate => "没年月日",
            Self::AgeAtDeath => "享年",
            Self::BirthPlace => "出生地",
            Self::Nationality => "国籍",
            Self::Ethnicity => "民族",
            Self::Residence => "居住",
            Self::Education => "最終学歴",
            Self::Occupation => "職歴",
            Self::Affiliation => "所属",
            Self::Institutions => "研究機関",
            Self::Field => "分野",
            Self::FieldCategory => "分野分類",
            Self::DoctoralThesis => "博士論文",
            Self::DoctoralAdvisor => "博士課程指導教員",
            Self::OtherAdvisors => "他の指導教員",
            Self::NotableWorks => "主な業績",
            Self::Influenced => "影響を与えた人物",
            Self::InfluencedBy => "影響を受けた人物",
            Self::Awards => "受賞歴",
            Self::ActivePeriods => "活動期間",
            Self::HonorificTitle => "称号",
            Self::Religion => "宗教",
            Self::Ideology => "思想",
            Self::Spouse => "配偶者",
            Self::Children => "子供",
            Self::Parents => "親",
        }
    }

    /// Fields whose values name relatives of the subject
    pub fn is_family(&self) -> bool {
        matches!(self, Self::Spouse | Self::Children | Self::Parents)
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Record
// ============================================================================

/// Infobox rows as scraped, before synonym resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInfobox {
    /// Header row text, or the page title when the table has no header
    pub subject: String,
    pub pairs: Vec<(String, String)>,
}

impl RawInfobox {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            pairs: Vec::new(),
        }
    }

    pub fn with_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// First value stored under exactly `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Normalized infobox of one page. Built once, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoboxRecord {
    subject: String,
    fields: BTreeMap<CanonicalField, FieldValue>,
    /// Raw keys the synonym table does not know
    uncategorized: BTreeMap<String, String>,
}

impl InfoboxRecord {
    pub fn new(
        subject: impl Into<String>,
        fields: BTreeMap<CanonicalField, FieldValue>,
        uncategorized: BTreeMap<String, String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            fields,
            uncategorized,
        }
    }

    /// Record for a page without an infobox
    pub fn empty(subject: impl Into<String>) -> Self {
        Self::new(subject, BTreeMap::new(), BTreeMap::new())
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn get(&self, field: CanonicalField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    pub fn date(&self, field: CanonicalField) -> Option<&DateRecord> {
        self.get(field).and_then(FieldValue::as_date)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&CanonicalField, &FieldValue)> {
        self.fields.iter()
    }

    pub fn uncategorized(&self) -> &BTreeMap<String, String> {
        &self.uncategorized
    }

    /// Relatives named in the spouse, children, and parents fields
    pub fn family_relations(&self) -> Vec<(CanonicalField, String)> {
        self.fields
            .iter()
            .filter(|(field, _)| field.is_family())
            .flat_map(|(field, value)| {
                value
                    .person_names()
                    .into_iter()
                    .filter(|name| !name.is_empty() && name != UNKNOWN)
                    .map(move |name| (*field, name))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.uncategorized.is_empty()
    }
}
