//! Person-name helpers for mixed-script names

use std::sync::LazyLock;

use bio_core::UNKNOWN;
use regex::Regex;

static JAPANESE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{4e00}-\u{9fff}\u{3040}-\u{309f}\u{30a0}-\u{30ff}\u{ff66}-\u{ff9f}々]+")
        .expect("japanese run pattern")
});

static FATHER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\p{Han}\p{Katakana}・ー々]+)\s*を父").expect("father pattern"));

static MOTHER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\p{Han}\p{Katakana}・ー々]+)\s*を母").expect("mother pattern"));

/// Kanji and kana runs of `name` joined together, or `不明`
pub fn extract_japanese_name(name: &str) -> String {
    let runs: Vec<&str> = JAPANESE_RUN_RE.find_iter(name).map(|m| m.as_str()).collect();
    if runs.is_empty() {
        UNKNOWN.to_string()
    } else {
        runs.concat()
    }
}

/// Split an infobox header such as `Albert Einstein アルベルト・アインシュタイン`
/// into the Japanese display name and the remaining (romanized) full name.
pub fn split_name_header(header: &str) -> (String, Option<String>) {
    let header = header.trim();
    let japanese = extract_japanese_name(header);
    if japanese == UNKNOWN {
        return (header.to_string(), None);
    }

    let remainder = JAPANESE_RUN_RE.replace_all(header, " ");
    let remainder = remainder
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let full_name = remainder
        .trim_matches(|c: char| c.is_whitespace() || c == '・' || c == ',')
        .to_string();

    (japanese, (!full_name.is_empty()).then_some(full_name))
}

/// Parents named in prose as `<name>を父` and `<name>を母`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parents {
    pub father: Option<String>,
    pub mother: Option<String>,
}

impl Parents {
    pub fn is_empty(&self) -> bool {
        self.father.is_none() && self.mother.is_none()
    }
}

/// Find the father and mother named in `text`
pub fn extract_parents(text: &str) -> Parents {
    let capture = |re: &Regex| {
        re.captures(text)
            .map(|caps| caps[1].trim_matches('・').to_string())
            .filter(|name| !name.is_empty())
    };
    Parents {
        father: capture(&FATHER_RE),
        mother: capture(&MOTHER_RE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_japanese_name() {
        assert_eq!(
            extract_japanese_name("Albert Einstein アルベルト・アインシュタイン"),
            "アルベルト・アインシュタイン"
        );
        assert_eq!(extract_japanese_name("夏目 漱石"), "夏目漱石");
        assert_eq!(extract_japanese_name("Marie Curie"), "不明");
        assert_eq!(extract_japanese_name(""), "不明");
    }

    #[test]
    fn test_split_name_header() {
        let (name, full) = split_name_header("Albert Einstein アルベルト・アインシュタイン");
        assert_eq!(name, "アルベルト・アインシュタイン");
        assert_eq!(full.as_deref(), Some("Albert Einstein"));

        let (name, full) = split_name_header("Marie Curie");
        assert_eq!(name, "Marie Curie");
        assert_eq!(full, None);
    }

    #[test]
    fn test_extract_parents() {
        let text = "アインシュタインは1879年3月14日、 ヘルマン・アインシュタイン を父、 パウリーネ・コッホ を母とし、その長男として生まれた。";
        let parents = extract_parents(text);
        assert_eq!(parents.father.as_deref(), Some("ヘルマン・アインシュタイン"));
        assert_eq!(parents.mother.as_deref(), Some("パウリーネ・コッホ"));
    }

    #[test]
    fn test_extract_parents_stops_at_particle() {
        let parents = extract_parents("彼はヘルマンを父とする。");
        assert_eq!(parents.father.as_deref(), Some("ヘルマン"));
        assert_eq!(parents.mother, None);
        assert!(extract_parents("").is_empty());
    }
}
