//! Timeline construction and analysis
//!
//! Each sentence of a section yields at most one event, dated by its earliest
//! year expression. Expressions starting at the same offset are ranked exact
//! date, era date, bare year, decade, century. Relative idioms (`N年後`,
//! `翌年`, `同年`) apply only to sentences without any of those and are
//! resolved against the last year seen in the same section.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use bio_core::config::TimelineConfig;
use bio_core::{
    ActivityPeriod, Section, TimelineAnalysis, TimelineEvent, TimelineYear, TurningPoint,
    TurningPointCategory,
};
use bio_normalizer::find_era_date;
use regex::Regex;

use crate::split_sentences;

/// `．` arrives here already folded to `.` by NFKC
const SENTENCE_TERMINATORS: &[char] = &['。', '.', '\n'];

static EXACT_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日").expect("exact date pattern")
});

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})\s*年(代)?").expect("year pattern"));

static SHORT_DECADE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2})\s*年代").expect("decade pattern"));

static CENTURY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s*世紀").expect("century pattern"));

static RELATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s*年後|翌年|同年").expect("relative year pattern"));

fn preceded_by_digit(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit())
}

// ============================================================================
// Event detection
// ============================================================================

/// Year and written date of one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
struct Detected {
    year: TimelineYear,
    date: String,
}

impl Detected {
    fn year(year: i32) -> Self {
        Self {
            year: TimelineYear::Year(year),
            date: String::new(),
        }
    }
}

fn detect_year(sentence: &str, last_year: Option<i32>) -> Option<Detected> {
    // (start offset, rank, detected); the rank orders expressions at one offset
    let mut candidates: Vec<(usize, u8, Detected)> = Vec::new();

    if let Some(caps) = EXACT_DATE_RE
        .captures_iter(sentence)
        .find(|caps| caps.get(0).is_some_and(|m| !preceded_by_digit(sentence, m.start())))
    {
        if let (Some(whole), Ok(year)) = (caps.get(0), caps[1].parse::<i32>()) {
            candidates.push((
                whole.start(),
                0,
                Detected {
                    year: TimelineYear::Year(year),
                    date: whole.as_str().to_string(),
                },
            ));
        }
    }

    if let Some(era) = find_era_date(sentence) {
        candidates.push((
            era.start,
            1,
            Detected {
                year: TimelineYear::Year(era.year),
                date: era.date.unwrap_or_default(),
            },
        ));
    }

    let year = YEAR_RE.captures_iter(sentence).find_map(|caps| {
        let whole = caps.get(0)?;
        if preceded_by_digit(sentence, whole.start()) {
            return None;
        }
        let year = caps[1].parse::<i32>().ok()?;
        let rank = if caps.get(2).is_some() { 3 } else { 2 };
        Some((whole.start(), rank, Detected::year(year)))
    });
    candidates.extend(year);

    let short_decade = SHORT_DECADE_RE.captures_iter(sentence).find_map(|caps| {
        let whole = caps.get(0)?;
        if preceded_by_digit(sentence, whole.start()) {
            return None;
        }
        let short: i32 = caps[1].parse().ok()?;
        let detected = match last_year {
            Some(anchor) => Detected::year(anchor / 100 * 100 + short),
            None => Detected {
                year: TimelineYear::Label(format!("{}年代", &caps[1])),
                date: String::new(),
            },
        };
        Some((whole.start(), 4, detected))
    });
    candidates.extend(short_decade);

    if let Some(caps) = CENTURY_RE.captures(sentence) {
        if let Some(whole) = caps.get(0) {
            candidates.push((
                whole.start(),
                5,
                Detected {
                    year: TimelineYear::Label(format!("{}世紀", &caps[1])),
                    date: String::new(),
                },
            ));
        }
    }

    if let Some((_, _, detected)) = candidates
        .into_iter()
        .min_by_key(|(start, rank, _)| (*start, *rank))
    {
        return Some(detected);
    }

    let anchor = last_year?;
    let caps = RELATIVE_RE.captures(sentence)?;
    let year = match caps.get(1) {
        Some(offset) => anchor + offset.as_str().parse::<i32>().ok()?,
        None if &caps[0] == "翌年" => anchor + 1,
        None => anchor,
    };
    Some(Detected::year(year))
}

// ============================================================================
// Tokenization
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Han,
    Hiragana,
    Katakana,
    Latin,
    Digit,
}

fn script_of(ch: char) -> Option<Script> {
    match ch {
        '々' | '\u{3400}'..='\u{4DBF}' | '\u{4E00}'..='\u{9FFF}' => Some(Script::Han),
        '\u{3041}'..='\u{309F}' => Some(Script::Hiragana),
        '・' => None,
        '\u{30A0}'..='\u{30FF}' => Some(Script::Katakana),
        c if c.is_ascii_digit() => Some(Script::Digit),
        c if c.is_alphabetic() => Some(Script::Latin),
        _ => None,
    }
}

/// Split text into maximal runs of one script, dropping punctuation and spaces
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_script = None;

    for ch in text.chars() {
        let script = script_of(ch);
        if script != current_script && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        if script.is_some() {
            current.push(ch);
        }
        current_script = script;
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

// ============================================================================
// Builder
// ============================================================================

/// Builds and analyses timelines
#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    config: TimelineConfig,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::from_config(TimelineConfig::default())
    }

    pub fn from_config(config: TimelineConfig) -> Self {
        Self { config }
    }

    pub fn with_activity_gap(mut self, gap: i32) -> Self {
        self.config.activity_gap = gap;
        self
    }

    /// Deduplicated events of all sections, sorted by year
    pub fn build(&self, sections: &[Section]) -> Vec<TimelineEvent> {
        let mut seen = HashSet::new();
        let mut events = Vec::new();

        for section in sections {
            let mut last_year = section
                .heading_text
                .as_deref()
                .and_then(|heading| detect_year(heading, None))
                .and_then(|detected| detected.year.as_year());

            for (_, sentence) in split_sentences(&section.text, SENTENCE_TERMINATORS) {
                let Some(detected) = detect_year(sentence, last_year) else {
                    continue;
                };
                if let Some(year) = detected.year.as_year() {
                    last_year = Some(year);
                }
                let event = TimelineEvent::new(detected.year, detected.date, sentence);
                if seen.insert(event.clone()) {
                    events.push(event);
                }
            }
        }

        events.sort_by(|a, b| a.year.cmp(&b.year));
        tracing::debug!("Built timeline with {} events", events.len());
        events
    }

    /// Derived views over `events`; the range filter is inclusive
    pub fn analyze(
        &self,
        events: &[TimelineEvent],
        start: Option<i32>,
        end: Option<i32>,
    ) -> TimelineAnalysis {
        if events.is_empty() {
            tracing::warn!("Timeline is empty; skipping analysis");
            return TimelineAnalysis::default();
        }

        let mut events_per_year = BTreeMap::new();
        let mut tokens_per_year: BTreeMap<TimelineYear, Vec<String>> = BTreeMap::new();
        for event in events {
            *events_per_year.entry(event.year.clone()).or_insert(0) += 1;
            tokens_per_year
                .entry(event.year.clone())
                .or_default()
                .extend(tokenize(&event.event));
        }

        let filtered_events = events
            .iter()
            .filter(|event| {
                event.year.as_year().is_some_and(|year| {
                    start.map_or(true, |s| year >= s) && end.map_or(true, |e| year <= e)
                })
            })
            .cloned()
            .collect();

        let years: Vec<i32> = events.iter().filter_map(|e| e.year.as_year()).collect();

        let turning_points = events
            .iter()
            .filter_map(|event| {
                self.classify_turning_point(&event.event)
                    .map(|category| TurningPoint {
                        year: event.year.clone(),
                        event: event.event.clone(),
                        category,
                    })
            })
            .collect();

        TimelineAnalysis {
            events_per_year,
            filtered_events,
            activity_periods: activity_periods(&years, self.config.activity_gap),
            turning_points,
            tokens_per_year,
        }
    }

    /// First category, in precedence order, with a keyword in any token
    pub fn classify_turning_point(&self, text: &str) -> Option<TurningPointCategory> {
        let tokens = tokenize(text);
        TurningPointCategory::PRECEDENCE.into_iter().find(|category| {
            self.keywords(*category).iter().any(|keyword| {
                tokens.iter().any(|token| token.contains(keyword.as_str()))
            })
        })
    }

    fn keywords(&self, category: TurningPointCategory) -> &[String] {
        match category {
            TurningPointCategory::CareerChange => &self.config.career_keywords,
            TurningPointCategory::Success => &self.config.success_keywords,
            TurningPointCategory::Failure => &self.config.failure_keywords,
        }
    }
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyse `events` with the default keyword lists and a gap of 3 years
pub fn analyze(events: &[TimelineEvent], start: Option<i32>, end: Option<i32>) -> TimelineAnalysis {
    TimelineBuilder::new().analyze(events, start, end)
}

/// Merge sorted distinct years into periods, splitting where the gap exceeds `max_gap`
pub fn activity_periods(years: &[i32], max_gap: i32) -> Vec<ActivityPeriod> {
    let mut years = years.to_vec();
    years.sort_unstable();
    years.dedup();

    let mut periods = Vec::new();
    let mut iter = years.into_iter();
    let Some(first) = iter.next() else {
        return periods;
    };

    let (mut start, mut last) = (first, first);
    for year in iter {
        if year - last > max_gap {
            periods.push(ActivityPeriod::new(start, last));
            start = year;
        }
        last = year;
    }
    periods.push(ActivityPeriod::new(start, last));
    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn section(heading: &str, text: &str) -> Section {
        Section::new(Vec::new(), Some(heading.to_string()), text)
    }

    fn years(events: &[TimelineEvent]) -> Vec<TimelineYear> {
        events.iter().map(|e| e.year.clone()).collect()
    }

    #[test]
    fn test_detect_precedence() {
        let exact = detect_year("1905年6月30日に論文を発表した。", None).unwrap();
        assert_eq!(exact.year, TimelineYear::Year(1905));
        assert_eq!(exact.date, "1905年6月30日");

        let era = detect_year("昭和20年8月15日に帰国。", None).unwrap();
        assert_eq!(era.year, TimelineYear::Year(1945));
        assert_eq!(era.date, "1945年8月15日");

        let year = detect_year("1921年に受賞し、1920年代の研究が評価された。", None).unwrap();
        assert_eq!(year.year, TimelineYear::Year(1921));
        assert_eq!(year.date, "");

        let decade = detect_year("1920年代に渡米した。", None).unwrap();
        assert_eq!(decade.year, TimelineYear::Year(1920));

        let century = detect_year("19世紀末の物理学。", None).unwrap();
        assert_eq!(century.year, TimelineYear::Label("19世紀".to_string()));

        assert_eq!(detect_year("幼少期を過ごした。", Some(1880)), None);
    }

    #[test]
    fn test_detect_earliest_expression_wins() {
        let gregorian_first = detect_year("1945年の終戦後、昭和21年に帰国した。", None).unwrap();
        assert_eq!(gregorian_first.year, TimelineYear::Year(1945));

        let era_first = detect_year("昭和21年、1945年の記録を公開した。", None).unwrap();
        assert_eq!(era_first.year, TimelineYear::Year(1946));

        let decade_first = detect_year("1920年代に渡米し、1921年に受賞。", None).unwrap();
        assert_eq!(decade_first.year, TimelineYear::Year(1920));

        let century_first = detect_year("19世紀末に生まれ、1905年に発表。", None).unwrap();
        assert_eq!(century_first.year, TimelineYear::Label("19世紀".to_string()));
    }

    #[test]
    fn test_detect_relative_idioms() {
        assert_eq!(
            detect_year("翌年に結婚した。", Some(1902)).map(|d| d.year),
            Some(TimelineYear::Year(1903))
        );
        assert_eq!(
            detect_year("同年、教授に就任。", Some(1909)).map(|d| d.year),
            Some(TimelineYear::Year(1909))
        );
        assert_eq!(
            detect_year("3年後に帰国した。", Some(1930)).map(|d| d.year),
            Some(TimelineYear::Year(1933))
        );
        assert_eq!(detect_year("翌年に結婚した。", None), None);
    }

    #[test]
    fn test_short_decade_uses_anchor_century() {
        assert_eq!(
            detect_year("20年代には講演した。", Some(1919)).map(|d| d.year),
            Some(TimelineYear::Year(1920))
        );
        assert_eq!(
            detect_year("20年代には講演した。", None).map(|d| d.year),
            Some(TimelineYear::Label("20年代".to_string()))
        );
    }

    #[test]
    fn test_build_splits_on_normalized_full_stop() {
        let sections = vec![section("業績", "1905年に質量が1.5倍と示した.翌年、学位を取得した.")];
        let events = TimelineBuilder::new().build(&sections);

        assert_eq!(
            years(&events),
            vec![TimelineYear::Year(1905), TimelineYear::Year(1906)]
        );
        assert_eq!(events[0].event, "1905年に質量が1.5倍と示した.");
    }

    #[test]
    fn test_build_dedupes_and_sorts() {
        let sections = vec![
            section("業績", "1905年に特殊相対性理論を発表した。翌年、学位を取得した。"),
            section("生涯", "1879年3月14日、ウルムに生まれた。19世紀末に移住。"),
            section("再掲", "1905年に特殊相対性理論を発表した。"),
        ];
        let events = TimelineBuilder::new().build(&sections);

        assert_eq!(
            years(&events),
            vec![
                TimelineYear::Label("19世紀".to_string()),
                TimelineYear::Year(1879),
                TimelineYear::Year(1905),
                TimelineYear::Year(1906),
            ]
        );
        assert_eq!(events[1].date, "1879年3月14日");
        assert_eq!(events[3].event, "翌年、学位を取得した。");
    }

    #[test]
    fn test_relative_years_do_not_cross_sections() {
        let sections = vec![
            section("前半", "1900年に入学した。"),
            section("後半", "翌年に卒業した。"),
        ];
        let events = TimelineBuilder::new().build(&sections);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_activity_periods_merge_small_gaps() {
        assert_eq!(
            activity_periods(&[1900, 1901, 1903, 1910], 3),
            vec![ActivityPeriod::new(1900, 1903), ActivityPeriod::new(1910, 1910)]
        );
        assert_eq!(
            activity_periods(&[1910, 1900, 1904, 1900], 3),
            vec![ActivityPeriod::new(1900, 1900), ActivityPeriod::new(1904, 1904), ActivityPeriod::new(1910, 1910)]
        );
        assert!(activity_periods(&[], 3).is_empty());
    }

    #[test]
    fn test_turning_point_precedence() {
        let builder = TimelineBuilder::new();
        assert_eq!(
            builder.classify_turning_point("教授に就任し、同年ノーベル賞を受賞した。"),
            Some(TurningPointCategory::CareerChange)
        );
        assert_eq!(
            builder.classify_turning_point("論文を発表したが撤退した。"),
            Some(TurningPointCategory::Success)
        );
        assert_eq!(
            builder.classify_turning_point("1955年に死去した。"),
            Some(TurningPointCategory::Failure)
        );
        assert_eq!(builder.classify_turning_point("ウルムに生まれた。"), None);
    }

    #[test]
    fn test_empty_timeline_analysis() {
        let analysis = analyze(&[], Some(1900), Some(1950));
        assert!(analysis.events_per_year.is_empty());
        assert!(analysis.filtered_events.is_empty());
        assert!(analysis.activity_periods.is_empty());
        assert!(analysis.turning_points.is_empty());
        assert!(analysis.tokens_per_year.is_empty());
    }

    #[test]
    fn test_analyze_filters_inclusive_and_skips_labels() {
        let events = vec![
            TimelineEvent::new(TimelineYear::Year(1900), "", "チューリッヒ工科大学を卒業した。"),
            TimelineEvent::new(TimelineYear::Label("19世紀".to_string()), "", "19世紀の物理学。"),
            TimelineEvent::new(TimelineYear::Year(1905), "", "論文を発表した。"),
            TimelineEvent::new(TimelineYear::Year(1921), "", "ノーベル物理学賞を受賞した。"),
        ];
        let analysis = analyze(&events, Some(1900), Some(1905));

        assert_eq!(analysis.filtered_events.len(), 2);
        assert_eq!(analysis.events_per_year.len(), 4);
        assert_eq!(
            analysis.activity_periods,
            vec![ActivityPeriod::new(1900, 1900), ActivityPeriod::new(1905, 1905), ActivityPeriod::new(1921, 1921)]
        );
        let categories: Vec<_> = analysis.turning_points.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![
                TurningPointCategory::CareerChange,
                TurningPointCategory::Success,
                TurningPointCategory::Success,
            ]
        );
        assert!(analysis.tokens_per_year[&TimelineYear::Year(1921)].contains(&"受賞".to_string()));
    }

    #[test]
    fn test_tokenize_script_runs() {
        assert_eq!(
            tokenize("1921年ノーベル物理学賞を受賞"),
            vec!["1921", "年", "ノーベル", "物理学賞", "を", "受賞"]
        );
        assert_eq!(tokenize("ハンス・アルベルト"), vec!["ハンス", "アルベルト"]);
        assert!(tokenize("。、 ").is_empty());
    }

    proptest! {
        #[test]
        fn prop_periods_cover_every_year(input in proptest::collection::vec(1800i32..2000, 0..30)) {
            let periods = activity_periods(&input, 3);
            let mut ys = input.clone();
            ys.sort_unstable();
            ys.dedup();
            for year in &ys {
                prop_assert!(periods.iter().any(|p| p.start <= *year && *year <= p.end));
            }
            for pair in periods.windows(2) {
                prop_assert!(pair[1].start - pair[0].end > 3);
            }
        }
    }
}
