//! Multi-entry infobox cells: periods, children, awards, and plain lists

use std::sync::LazyLock;

use bio_core::{AwardEntry, ChildEntry, PeriodEntry, UNKNOWN};
use regex::Regex;

static PERIOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([^\d\s()（）]+(?:\s[^\d\s()（）]+)*)\s*[(（]?\s*(\d{4})\s*年?\s*[-–—~〜]\s*(\d{2,4})\s*年?\s*[)）]?",
    )
    .expect("period pattern")
});

static CHILD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\d\s(（)）]+").expect("child name pattern"));

static FOUR_DIGIT_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("year pattern"));

static AWARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\D+?)\s*[(（]?(\d{4})\s*年?\s*[)）]?").expect("award pattern"));

static FIELD_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[・、,\s]+").expect("field separator pattern"));

/// The value itself, or `不明` when absent or blank
pub fn handle_missing_value(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn expand_end_year(start: &str, end: &str) -> Option<i32> {
    let start_year: i32 = start.parse().ok()?;
    let end_year: i32 = end.parse().ok()?;
    if end.len() == 2 {
        Some(start_year / 100 * 100 + end_year)
    } else {
        Some(end_year)
    }
}

/// Parse `<names> <start>-<end>` repeated, as used for nationality,
/// affiliation, and spouse cells. A two-digit end year takes the century of
/// the start year. Cells without any period become one names-only entry.
pub fn parse_periods(text: &str) -> Vec<PeriodEntry> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let entries: Vec<PeriodEntry> = PERIOD_RE
        .captures_iter(text)
        .map(|caps| PeriodEntry {
            names: caps[1].split_whitespace().map(str::to_string).collect(),
            start: caps[2].parse().ok(),
            end: expand_end_year(&caps[2], &caps[3]),
        })
        .collect();

    if !entries.is_empty() {
        return entries;
    }

    let names: Vec<String> = text
        .split_whitespace()
        .filter(|token| !token.chars().any(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect();
    vec![PeriodEntry::names_only(names)]
}

/// Split before every whitespace run that is followed by neither a digit nor an opening bracket
fn split_child_entries(text: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut entry_start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !ch.is_whitespace() {
            continue;
        }
        let space_start = idx;
        while let Some(&(_, next)) = chars.peek() {
            if next.is_whitespace() {
                chars.next();
            } else {
                break;
            }
        }
        match chars.peek() {
            Some(&(next_idx, next)) if !next.is_ascii_digit() && !matches!(next, '(' | '（') => {
                entries.push(&text[entry_start..space_start]);
                entry_start = next_idx;
            }
            _ => {}
        }
    }
    entries.push(&text[entry_start..]);
    entries.into_iter().filter(|e| !e.trim().is_empty()).collect()
}

/// Parse children entries such as `リーゼル 1902-1903? ハンス・アルベルト 1904-1973`
pub fn parse_children(text: &str) -> Vec<ChildEntry> {
    split_child_entries(text.trim())
        .into_iter()
        .map(|entry| {
            let years: Vec<i32> = FOUR_DIGIT_YEAR_RE
                .find_iter(entry)
                .filter_map(|m| m.as_str().parse().ok())
                .collect();
            ChildEntry {
                name: CHILD_NAME_RE.find(entry).map(|m| m.as_str().to_string()),
                birth_year: years.first().copied(),
                death_year: years.get(1).copied(),
                death_year_uncertain: entry.contains('?'),
            }
        })
        .collect()
}

/// Extract `<award> <YYYY>年` pairs
pub fn parse_awards(text: &str) -> Vec<AwardEntry> {
    AWARD_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let award = caps[1].trim();
            let year = caps[2].parse().ok()?;
            (!award.is_empty()).then(|| AwardEntry {
                award: award.to_string(),
                year,
            })
        })
        .collect()
}

/// Split a research-field style cell on `・`, commas and whitespace
pub fn split_field_list(text: &str) -> Vec<String> {
    FIELD_SPLIT_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a cell on whitespace only, keeping `・` inside names
pub fn split_whitespace_list(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_handle_missing_value() {
        assert_eq!(handle_missing_value(None), "不明");
        assert_eq!(handle_missing_value(Some("  ")), "不明");
        assert_eq!(handle_missing_value(Some("物理学者")), "物理学者");
    }

    #[test]
    fn test_parse_spouse_periods() {
        let entries = parse_periods("ミレヴァ・マリッチ 1903-1919 エルザ・レーベンタール 1919-1936");
        assert_eq!(
            entries,
            vec![
                PeriodEntry {
                    names: vec!["ミレヴァ・マリッチ".to_string()],
                    start: Some(1903),
                    end: Some(1919),
                },
                PeriodEntry {
                    names: vec!["エルザ・レーベンタール".to_string()],
                    start: Some(1919),
                    end: Some(1936),
                },
            ]
        );
    }

    #[test]
    fn test_parse_nationality_multiple_names_and_short_end() {
        let entries = parse_periods("ドイツ帝国 スイス 1901-55");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].names, vec!["ドイツ帝国", "スイス"]);
        assert_eq!(entries[0].start, Some(1901));
        assert_eq!(entries[0].end, Some(1955));
    }

    #[test]
    fn test_parse_periods_names_only() {
        let entries = parse_periods("ドイツ スイス アメリカ合衆国");
        assert_eq!(
            entries,
            vec![PeriodEntry::names_only(vec![
                "ドイツ".to_string(),
                "スイス".to_string(),
                "アメリカ合衆国".to_string(),
            ])]
        );
        assert!(parse_periods("").is_empty());
    }

    #[test]
    fn test_parse_children() {
        let children =
            parse_children("リーゼル 1902-1903? ハンス・アルベルト 1904-1973 エドゥアルト 1910-1965");
        assert_eq!(children.len(), 3);

        assert_eq!(children[0].name.as_deref(), Some("リーゼル"));
        assert_eq!(children[0].birth_year, Some(1902));
        assert_eq!(children[0].death_year, Some(1903));
        assert!(children[0].death_year_uncertain);

        assert_eq!(children[1].name.as_deref(), Some("ハンス・アルベルト"));
        assert_eq!(children[1].death_year, Some(1973));
        assert!(!children[1].death_year_uncertain);

        assert_eq!(children[2].name.as_deref(), Some("エドゥアルト"));
        assert_eq!(children[2].birth_year, Some(1910));
    }

    #[test]
    fn test_parse_children_with_bracketed_years() {
        let children = parse_children("ハンス・アルベルト(1904-1973) エドゥアルト （1910-1965）");
        assert_eq!(children.len(), 2);

        assert_eq!(children[0].name.as_deref(), Some("ハンス・アルベルト"));
        assert_eq!(children[0].birth_year, Some(1904));
        assert_eq!(children[0].death_year, Some(1973));

        assert_eq!(children[1].name.as_deref(), Some("エドゥアルト"));
        assert_eq!(children[1].birth_year, Some(1910));
    }

    #[test]
    fn test_parse_children_names_only() {
        let children = parse_children("イレーヌ・ジョリオキュリー エーヴ・キュリー");
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].name.as_deref(), Some("エーヴ・キュリー"));
        assert_eq!(children[1].birth_year, None);
        assert!(parse_children("").is_empty());
    }

    #[test]
    fn test_parse_awards() {
        let awards = parse_awards("ノーベル物理学賞 1903年 ノーベル化学賞 1911年");
        assert_eq!(
            awards,
            vec![
                AwardEntry {
                    award: "ノーベル物理学賞".to_string(),
                    year: 1903,
                },
                AwardEntry {
                    award: "ノーベル化学賞".to_string(),
                    year: 1911,
                },
            ]
        );
        assert!(parse_awards("放射能 の研究").is_empty());
    }

    #[test]
    fn test_split_lists() {
        assert_eq!(split_field_list("物理学・化学 数学"), vec!["物理学", "化学", "数学"]);
        assert_eq!(
            split_whitespace_list("チューリッヒ工科大学 チューリッヒ大学"),
            vec!["チューリッヒ工科大学", "チューリッヒ大学"]
        );
    }

    proptest! {
        #[test]
        fn prop_entry_parsers_are_total(s in "\\PC{0,40}") {
            let _ = parse_periods(&s);
            let _ = parse_awards(&s);
            let children = parse_children(&s);
            prop_assert!(children.len() <= s.chars().count());
        }
    }
}
