//! Birthplace parsing and location/field standardization

use std::sync::LazyLock;

use bio_core::PlaceRecord;
use regex::Regex;

/// Countries recognized at the start of a birthplace string
pub const KNOWN_COUNTRIES: [&str; 15] = [
    "アメリカ合衆国",
    "ドイツ帝国",
    "ポーランド立憲王国",
    "フランス共和国",
    "日本",
    "イギリス",
    "カナダ",
    "中国",
    "ロシア",
    "インド",
    "ブラジル",
    "オーストラリア",
    "イタリア",
    "スペイン",
    "韓国",
];

static COUNTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = KNOWN_COUNTRIES
        .iter()
        .map(|c| regex::escape(c))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("({})", alternation)).expect("country pattern")
});

static US_STATE_CITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\d\s]+州)\s*([^\d\s]+)$").expect("state pattern"));

static KINGDOM_CITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\d\s]+王国)?\s*([^\d\s]+)$").expect("kingdom pattern"));

static PLACE_AFTER_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}\s*年\s*\d{1,2}\s*月\s*\d{1,2}\s*日\s*(?:\(\d+歳\)\s*)?(.+)")
        .expect("place-after-date pattern")
});

/// Canonical spelling of common prefecture names
pub fn standardize_location(location: &str) -> String {
    match location {
        "東京" => "東京都".to_string(),
        "大阪" => "大阪府".to_string(),
        "京都" => "京都府".to_string(),
        "北海" => "北海道".to_string(),
        other => other.to_string(),
    }
}

/// Broad category of a research field
pub fn standardize_field(field: &str) -> String {
    match field {
        "物理学" | "化学" | "生物学" | "数学" | "天文学" => "科学".to_string(),
        "文学" | "哲学" | "歴史学" | "言語学" => "人文科学".to_string(),
        other => other.to_string(),
    }
}

fn trim_separators(text: &str) -> &str {
    text.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '・' | '、' | ','))
        .trim()
}

/// Split a birthplace into country, state or kingdom, and city.
///
/// Without a known country the string is kept only as `raw`, unless it is a
/// single token, which is taken as the city.
pub fn parse_birthplace(text: &str) -> PlaceRecord {
    let raw = text.trim().to_string();
    let mut place = PlaceRecord {
        raw: raw.clone(),
        ..Default::default()
    };

    let Some(country) = COUNTRY_RE.find(&raw) else {
        if !raw.is_empty() && !raw.contains(char::is_whitespace) {
            place.city = Some(standardize_location(&raw));
        }
        return place;
    };

    let remaining = trim_separators(&raw[country.end()..]);
    let pattern = if country.as_str() == "アメリカ合衆国" {
        &*US_STATE_CITY_RE
    } else {
        &*KINGDOM_CITY_RE
    };

    if let Some(caps) = pattern.captures(remaining) {
        place.country = Some(country.as_str().to_string());
        place.region = caps.get(1).map(|m| m.as_str().to_string());
        place.city = caps.get(2).map(|m| standardize_location(m.as_str()));
    } else {
        tracing::debug!("No state or city after country in: {}", raw);
        place.country = Some(country.as_str().to_string());
    }

    place
}

/// The place written after a full date in a birth or death cell
pub fn place_after_date(cell: &str) -> Option<String> {
    PLACE_AFTER_DATE_RE
        .captures(cell)
        .map(|caps| caps[1].trim().to_string())
        .filter(|place| !place.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standardize_location() {
        assert_eq!(standardize_location("東京"), "東京都");
        assert_eq!(standardize_location("大阪"), "大阪府");
        assert_eq!(standardize_location("ウルム"), "ウルム");
    }

    #[test]
    fn test_standardize_field() {
        assert_eq!(standardize_field("物理学"), "科学");
        assert_eq!(standardize_field("化学"), "科学");
        assert_eq!(standardize_field("文学"), "人文科学");
        assert_eq!(standardize_field("経済学"), "経済学");
    }

    #[test]
    fn test_birthplace_united_states() {
        let place = parse_birthplace("アメリカ合衆国カリフォルニア州パロアルト");
        assert_eq!(place.country.as_deref(), Some("アメリカ合衆国"));
        assert_eq!(place.region.as_deref(), Some("カリフォルニア州"));
        assert_eq!(place.city.as_deref(), Some("パロアルト"));
    }

    #[test]
    fn test_birthplace_separator() {
        let place = parse_birthplace("ポーランド立憲王国・ワルシャワ");
        assert_eq!(place.country.as_deref(), Some("ポーランド立憲王国"));
        assert_eq!(place.region, None);
        assert_eq!(place.city.as_deref(), Some("ワルシャワ"));
    }

    #[test]
    fn test_birthplace_kingdom() {
        let place = parse_birthplace("ドイツ帝国 ヴュルテンベルク王国 ウルム");
        assert_eq!(place.country.as_deref(), Some("ドイツ帝国"));
        assert_eq!(place.region.as_deref(), Some("ヴュルテンベルク王国"));
        assert_eq!(place.city.as_deref(), Some("ウルム"));
    }

    #[test]
    fn test_birthplace_without_country() {
        let place = parse_birthplace("東京");
        assert_eq!(place.country, None);
        assert_eq!(place.city.as_deref(), Some("東京都"));

        let place = parse_birthplace("");
        assert_eq!(place, PlaceRecord::default());
    }

    #[test]
    fn test_place_after_date() {
        assert_eq!(
            place_after_date("1879年3月14日 ドイツ帝国 ヴュルテンベルク王国 ウルム").as_deref(),
            Some("ドイツ帝国 ヴュルテンベルク王国 ウルム")
        );
        assert_eq!(place_after_date("1879年3月14日"), None);
    }
}
