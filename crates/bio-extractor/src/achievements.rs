//! Achievement mining from article prose

use std::collections::HashSet;
use std::sync::LazyLock;

use bio_core::{Achievement, Section};
use regex::Regex;

use crate::split_sentences;

static NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s年月日]|頃").expect("noise pattern"));

static YEAR_ACHIEVEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})年(.*?)(達成|発表|受賞|設立)").expect("year achievement pattern")
});

static AGE_ACHIEVEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})歳(.*?)(達成|発表|受賞|設立)").expect("age achievement pattern")
});

/// Accomplishments in the section texts, ordered by the subject's age.
///
/// Year-dated matches after `death_year` are dropped; matches without a known
/// age sort last.
pub fn extract_achievements(
    sections: &[Section],
    birth_year: Option<i32>,
    death_year: Option<i32>,
) -> Vec<Achievement> {
    let mut achievements = Vec::new();
    let mut seen = HashSet::new();

    for section in sections {
        for (_, sentence) in split_sentences(&section.text, &['。', '.', '\n']) {
            let cleaned = NOISE_RE.replace_all(sentence, "");

            for caps in YEAR_ACHIEVEMENT_RE.captures_iter(&cleaned) {
                let Ok(year) = caps[1].parse::<i32>() else {
                    continue;
                };
                if death_year.is_some_and(|death| year > death) {
                    continue;
                }
                let achievement = Achievement {
                    content: format!("{}{}", caps[2].trim(), &caps[3]),
                    period: format!("{}年", year),
                    age: birth_year.map(|birth| year - birth),
                };
                if seen.insert((achievement.content.clone(), achievement.period.clone())) {
                    achievements.push(achievement);
                }
            }

            for caps in AGE_ACHIEVEMENT_RE.captures_iter(&cleaned) {
                let Ok(age) = caps[1].parse::<i32>() else {
                    continue;
                };
                // The age must not be the tail of a longer number
                if caps.get(1).is_some_and(|m| {
                    cleaned[..m.start()]
                        .chars()
                        .next_back()
                        .is_some_and(|c| c.is_ascii_digit())
                }) {
                    continue;
                }
                let achievement = Achievement {
                    content: format!("{}{}", caps[2].trim(), &caps[3]),
                    period: format!("{}歳", age),
                    age: Some(age),
                };
                if seen.insert((achievement.content.clone(), achievement.period.clone())) {
                    achievements.push(achievement);
                }
            }
        }
    }

    achievements.sort_by_key(|a| (a.age.is_none(), a.age));
    tracing::debug!("Found {} achievements", achievements.len());
    achievements
}
