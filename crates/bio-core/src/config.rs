//! Bio Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with defaults tuned for Japanese Wikipedia biographies.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Section and text extraction
    pub extraction: ExtractionConfig,

    /// Timeline analysis
    pub timeline: TimelineConfig,

    /// Entity and relation extraction
    pub network: NetworkConfig,

    /// JSON dump settings
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Extraction
        if let Ok(keywords) = std::env::var("BIO_EXCLUDED_SECTIONS") {
            config.extraction.excluded_section_keywords = split_list(&keywords);
        }
        if let Ok(words) = std::env::var("BIO_EXCLUDE_WORDS") {
            config.extraction.exclude_words = split_list(&words);
        }
        if let Ok(flag) = std::env::var("BIO_EMIT_FRAGMENTS") {
            config.extraction.emit_fragments = parse_bool("BIO_EMIT_FRAGMENTS", &flag)?;
        }

        // Timeline
        if let Ok(gap) = std::env::var("BIO_ACTIVITY_GAP") {
            config.timeline.activity_gap = gap.parse().map_err(|_| ConfigError::InvalidValue {
                key: "BIO_ACTIVITY_GAP".to_string(),
                value: gap,
            })?;
        }

        // Network
        if let Ok(threshold) = std::env::var("BIO_FUZZY_THRESHOLD") {
            config.network.fuzzy_threshold =
                threshold.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "BIO_FUZZY_THRESHOLD".to_string(),
                    value: threshold,
                })?;
        }
        if let Ok(classifier) = std::env::var("BIO_RELATION_CLASSIFIER") {
            config.network.classifier = classifier.parse()?;
        }
        if let Ok(names) = std::env::var("BIO_PERSON_LEXICON") {
            config.network.person_lexicon = split_list(&names);
        }

        // Output
        if let Ok(dir) = std::env::var("BIO_OUTPUT_DIR") {
            config.output.directory = PathBuf::from(dir);
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(flag) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_bool("LOG_JSON", &flag)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.extraction.excluded_section_keywords
            != defaults.extraction.excluded_section_keywords
        {
            self.extraction.excluded_section_keywords =
                env_config.extraction.excluded_section_keywords;
        }
        if env_config.extraction.exclude_words != defaults.extraction.exclude_words {
            self.extraction.exclude_words = env_config.extraction.exclude_words;
        }
        if env_config.extraction.emit_fragments != defaults.extraction.emit_fragments {
            self.extraction.emit_fragments = env_config.extraction.emit_fragments;
        }
        if env_config.timeline.activity_gap != defaults.timeline.activity_gap {
            self.timeline.activity_gap = env_config.timeline.activity_gap;
        }
        if env_config.network.fuzzy_threshold != defaults.network.fuzzy_threshold {
            self.network.fuzzy_threshold = env_config.network.fuzzy_threshold;
        }
        if env_config.network.classifier != defaults.network.classifier {
            self.network.classifier = env_config.network.classifier;
        }
        if !env_config.network.person_lexicon.is_empty() {
            self.network.person_lexicon = env_config.network.person_lexicon;
        }
        if env_config.output.directory != defaults.output.directory {
            self.output.directory = env_config.output.directory;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }

        Ok(self)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.network.fuzzy_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidValue {
                key: "network.fuzzy_threshold".to_string(),
                value: threshold.to_string(),
            });
        }
        if self.timeline.activity_gap < 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeline.activity_gap".to_string(),
                value: self.timeline.activity_gap.to_string(),
            });
        }
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Section and text extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Sections whose own heading contains one of these are dropped
    pub excluded_section_keywords: Vec<String>,

    /// Words removed from section text
    pub exclude_words: Vec<String>,

    /// Emit one untitled fragment per content block
    pub emit_fragments: bool,

    /// Keep the untitled lead block before the first heading
    pub include_lead: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            excluded_section_keywords: strings(&[
                "著作",
                "参考文献",
                "関連文献",
                "作品",
                "書誌情報",
                "選集",
                "全集",
                "共著",
                "脚注",
                "注釈",
                "出典",
                "関連項目",
            ]),
            exclude_words: strings(&["Null"]),
            emit_fragments: false,
            include_lead: true,
        }
    }
}

/// Timeline analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Largest gap in years still merged into one activity period
    pub activity_gap: i32,

    pub career_keywords: Vec<String>,

    pub success_keywords: Vec<String>,

    pub failure_keywords: Vec<String>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            activity_gap: 3,
            career_keywords: strings(&[
                "就任", "退任", "転職", "入社", "卒業", "入学", "就職", "退職", "異動", "昇進",
                "降格", "転籍", "出向",
            ]),
            success_keywords: strings(&[
                "受賞", "成功", "発表", "出版", "達成", "開発", "設立", "創設", "創立", "完成",
                "発売", "公開", "ヒット", "貢献", "寄与",
            ]),
            failure_keywords: strings(&[
                "失敗", "敗北", "撤退", "辞任", "逮捕", "解任", "辞職", "倒産", "解散", "炎上",
                "不祥事", "事故", "事件", "災害", "死去", "死亡", "解雇", "リストラ",
            ]),
        }
    }
}

/// Entity and relation extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Minimum partial-ratio similarity for two names to be one person
    pub fuzzy_threshold: f64,

    /// Extra person names the pattern recognizer may miss
    pub person_lexicon: Vec<String>,

    /// Relation classification strategy
    pub classifier: ClassifierKind,

    /// Keep pairs whose relation could not be classified
    pub include_unknown: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.8,
            person_lexicon: Vec::new(),
            classifier: ClassifierKind::Keyword,
            include_unknown: true,
        }
    }
}

/// Supported relation classifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Predicate keyword heuristic
    Keyword,
    /// Every pair is `unknown`
    Unknown,
}

impl std::str::FromStr for ClassifierKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "unknown" | "none" => Ok(Self::Unknown),
            _ => Err(ConfigError::InvalidValue {
                key: "BIO_RELATION_CLASSIFIER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// JSON output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory JSON dumps are written to
    pub directory: PathBuf,

    /// Indent JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            pretty: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
