//! Infobox normalization
//!
//! Raw infobox labels are resolved once through a static synonym table,
//! then each canonical field is parsed into its typed payload.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use bio_core::{CanonicalField, DateRecord, FieldValue, InfoboxRecord, RawInfobox};

use crate::date::{age_at_death, parse_date};
use crate::entries::{
    handle_missing_value, parse_awards, parse_children, parse_periods, split_field_list,
    split_whitespace_list,
};
use crate::names::split_name_header;
use crate::place::{parse_birthplace, place_after_date, standardize_field};
use crate::text::nfkc;

/// Raw infobox label to canonical field. Earlier entries win.
pub const SYNONYMS: &[(&str, CanonicalField)] = &[
    // Identity
    ("氏名", CanonicalField::Name),
    ("名前", CanonicalField::Name),
    ("name", CanonicalField::Name),
    ("本名", CanonicalField::FullName),
    ("原語名", CanonicalField::FullName),
    // Dates
    ("生年月日", CanonicalField::BirthDate),
    ("生誕", CanonicalField::BirthDate),
    ("誕生日", CanonicalField::BirthDate),
    ("誕生", CanonicalField::BirthDate),
    ("出生", CanonicalField::BirthDate),
    ("birth_date", CanonicalField::BirthDate),
    ("没年月日", CanonicalField::DeathDate),
    ("死没", CanonicalField::DeathDate),
    ("死亡日", CanonicalField::DeathDate),
    ("死亡", CanonicalField::DeathDate),
    ("死去", CanonicalField::DeathDate),
    ("death_date", CanonicalField::DeathDate),
    // Places and origin
    ("出生地", CanonicalField::BirthPlace),
    ("出身地", CanonicalField::BirthPlace),
    ("生地", CanonicalField::BirthPlace),
    ("birth_place", CanonicalField::BirthPlace),
    ("国籍", CanonicalField::Nationality),
    ("国", CanonicalField::Nationality),
    ("市民権", CanonicalField::Nationality),
    ("nationality", CanonicalField::Nationality),
    ("民族", CanonicalField::Ethnicity),
    ("ethnicity", CanonicalField::Ethnicity),
    ("居住", CanonicalField::Residence),
    ("居住地", CanonicalField::Residence),
    ("residence", CanonicalField::Residence),
    // Career
    ("最終学歴", CanonicalField::Education),
    ("学歴", CanonicalField::Education),
    ("出身校", CanonicalField::Education),
    ("母校", CanonicalField::Education),
    ("education", CanonicalField::Education),
    ("職歴", CanonicalField::Occupation),
    ("職業", CanonicalField::Occupation),
    ("occupation", CanonicalField::Occupation),
    ("所属", CanonicalField::Affiliation),
    ("affiliation", CanonicalField::Affiliation),
    ("研究機関", CanonicalField::Institutions),
    ("勤務先", CanonicalField::Institutions),
    ("分野", CanonicalField::Field),
    ("研究分野", CanonicalField::Field),
    ("専門", CanonicalField::Field),
    ("専門分野", CanonicalField::Field),
    ("field", CanonicalField::Field),
    ("博士論文", CanonicalField::DoctoralThesis),
    ("博士課程指導教員", CanonicalField::DoctoralAdvisor),
    ("指導教員", CanonicalField::DoctoralAdvisor),
    ("他の指導教員", CanonicalField::OtherAdvisors),
    ("主な業績", CanonicalField::NotableWorks),
    ("業績", CanonicalField::NotableWorks),
    ("代表作", CanonicalField::NotableWorks),
    ("notable_works", CanonicalField::NotableWorks),
    ("影響を与えた人物", CanonicalField::Influenced),
    ("影響を受けた人物", CanonicalField::InfluencedBy),
    ("受賞歴", CanonicalField::Awards),
    ("主な受賞歴", CanonicalField::Awards),
    ("受賞", CanonicalField::Awards),
    ("表彰", CanonicalField::Awards),
    ("awards", CanonicalField::Awards),
    ("活動期間", CanonicalField::ActivePeriods),
    ("active_periods", CanonicalField::ActivePeriods),
    ("称号", CanonicalField::HonorificTitle),
    ("肩書", CanonicalField::HonorificTitle),
    ("役職", CanonicalField::HonorificTitle),
    ("honorific_title", CanonicalField::HonorificTitle),
    ("宗教", CanonicalField::Religion),
    ("religion", CanonicalField::Religion),
    ("思想", CanonicalField::Ideology),
    ("ideology", CanonicalField::Ideology),
    // Family
    ("配偶者", CanonicalField::Spouse),
    ("夫", CanonicalField::Spouse),
    ("妻", CanonicalField::Spouse),
    ("spouse", CanonicalField::Spouse),
    ("子供", CanonicalField::Children),
    ("子女", CanonicalField::Children),
    ("子", CanonicalField::Children),
    ("children", CanonicalField::Children),
    ("親", CanonicalField::Parents),
    ("両親", CanonicalField::Parents),
    ("父母", CanonicalField::Parents),
    ("父", CanonicalField::Parents),
    ("母", CanonicalField::Parents),
    ("parents", CanonicalField::Parents),
];

static SYNONYM_INDEX: LazyLock<HashMap<&'static str, CanonicalField>> = LazyLock::new(|| {
    let mut index = HashMap::new();
    for (label, field) in SYNONYMS {
        index.entry(*label).or_insert(*field);
    }
    index
});

fn lookup_key(raw: &str) -> String {
    nfkc(raw)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Canonical field for a raw infobox label
pub fn resolve_key(raw: &str) -> Option<CanonicalField> {
    SYNONYM_INDEX.get(lookup_key(raw).as_str()).copied()
}

fn typed_value(field: CanonicalField, text: &str) -> FieldValue {
    match field {
        CanonicalField::BirthDate | CanonicalField::DeathDate => FieldValue::Date(parse_date(text)),
        CanonicalField::BirthPlace => FieldValue::Place(parse_birthplace(text)),
        CanonicalField::Nationality | CanonicalField::Affiliation | CanonicalField::Spouse => {
            FieldValue::Periods(parse_periods(text))
        }
        CanonicalField::Children => FieldValue::Children(parse_children(text)),
        CanonicalField::Awards => {
            let awards = parse_awards(text);
            if awards.is_empty() {
                FieldValue::List(split_whitespace_list(text))
            } else {
                FieldValue::Awards(awards)
            }
        }
        CanonicalField::Field => FieldValue::List(split_field_list(text)),
        CanonicalField::Residence
        | CanonicalField::Education
        | CanonicalField::Occupation
        | CanonicalField::Institutions
        | CanonicalField::DoctoralAdvisor
        | CanonicalField::OtherAdvisors
        | CanonicalField::NotableWorks
        | CanonicalField::Influenced
        | CanonicalField::InfluencedBy
        | CanonicalField::HonorificTitle
        | CanonicalField::Parents => FieldValue::List(split_whitespace_list(text)),
        _ => FieldValue::Text(handle_missing_value(Some(text))),
    }
}

/// Build the typed record for one page's raw infobox
pub fn normalize_infobox(raw: &RawInfobox) -> InfoboxRecord {
    let mut grouped: BTreeMap<CanonicalField, Vec<&str>> = BTreeMap::new();
    let mut uncategorized = BTreeMap::new();

    for (key, value) in &raw.pairs {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match resolve_key(key) {
            Some(field) => grouped.entry(field).or_default().push(value),
            None => {
                tracing::debug!("Uncategorized infobox key: {}", key);
                uncategorized
                    .entry(key.trim().to_string())
                    .or_insert_with(|| value.to_string());
            }
        }
    }

    let mut fields: BTreeMap<CanonicalField, FieldValue> = grouped
        .iter()
        .map(|(field, values)| (*field, typed_value(*field, &values.join(" "))))
        .collect();

    // Name and full name come from the header unless the table has its own rows
    let header = grouped
        .get(&CanonicalField::Name)
        .and_then(|values| values.first().copied())
        .unwrap_or(raw.subject.as_str());
    let (name, full_name) = split_name_header(header);
    fields.insert(CanonicalField::Name, FieldValue::Text(handle_missing_value(Some(&name))));
    if let Some(full_name) = full_name {
        fields
            .entry(CanonicalField::FullName)
            .or_insert(FieldValue::Text(full_name));
    }

    if !raw.is_empty() {
        let birth_cell = grouped
            .get(&CanonicalField::BirthDate)
            .map(|values| values.join(" "))
            .unwrap_or_default();
        if !fields.contains_key(&CanonicalField::BirthPlace) {
            if let Some(place) = place_after_date(&birth_cell) {
                fields.insert(CanonicalField::BirthPlace, FieldValue::Place(parse_birthplace(&place)));
            }
        }

        let birth = fields
            .entry(CanonicalField::BirthDate)
            .or_insert_with(|| FieldValue::Date(DateRecord::unknown()))
            .as_date()
            .cloned()
            .unwrap_or_default();
        let age = fields
            .get(&CanonicalField::DeathDate)
            .and_then(FieldValue::as_date)
            .map(|death| age_at_death(&birth, death));
        if let Some(age) = age {
            fields.insert(CanonicalField::AgeAtDeath, FieldValue::Age(age));
        }
    }

    let categories = match fields.get(&CanonicalField::Field) {
        Some(FieldValue::List(items)) => {
            let mut categories: Vec<String> = Vec::new();
            for category in items.iter().map(|item| standardize_field(item)) {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }
            Some(categories)
        }
        _ => None,
    };
    if let Some(categories) = categories {
        fields.insert(CanonicalField::FieldCategory, FieldValue::List(categories));
    }

    tracing::debug!(
        "Normalized infobox for {}: {} fields, {} uncategorized",
        raw.subject,
        fields.len(),
        uncategorized.len()
    );

    InfoboxRecord::new(name, fields, uncategorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bio_core::Known;
    use pretty_assertions::assert_eq;

    fn einstein() -> RawInfobox {
        RawInfobox::new("Albert Einstein アルベルト・アインシュタイン")
            .with_pair("生誕", "1879年3月14日 ドイツ帝国 ヴュルテンベルク王国 ウルム")
            .with_pair("死没", "1955年4月18日(76歳没) アメリカ合衆国 ニュージャージー州 プリンストン")
            .with_pair("国籍", "ドイツ帝国 スイス 1901-55")
            .with_pair("研究分野", "物理学・哲学")
            .with_pair("配偶者", "ミレヴァ・マリッチ 1903-1919 エルザ・レーベンタール 1919-1936")
            .with_pair("子供", "リーゼル 1902-1903? ハンス・アルベルト 1904-1973")
            .with_pair("主な受賞歴", "ノーベル物理学賞 1921年 コプリ・メダル 1925年")
            .with_pair("署名", "Albert Einstein")
    }

    #[test]
    fn test_resolve_key_synonyms() {
        assert_eq!(resolve_key("生誕"), Some(CanonicalField::BirthDate));
        assert_eq!(resolve_key("誕生日"), Some(CanonicalField::BirthDate));
        assert_eq!(resolve_key(" 生年月日 "), Some(CanonicalField::BirthDate));
        assert_eq!(resolve_key("Birth_Date"), Some(CanonicalField::BirthDate));
        assert_eq!(resolve_key("署名"), None);
    }

    #[test]
    fn test_synonym_table_is_many_to_one() {
        let mut seen = std::collections::HashSet::new();
        for (label, _) in SYNONYMS {
            assert!(seen.insert(*label), "duplicate label {}", label);
        }
    }

    #[test]
    fn test_normalize_dates_and_age() {
        let record = normalize_infobox(&einstein());

        assert_eq!(record.subject(), "アルベルト・アインシュタイン");
        assert_eq!(
            record.date(CanonicalField::BirthDate).map(|d| d.full.as_str()),
            Some("1879-03-14")
        );
        assert_eq!(
            record.date(CanonicalField::DeathDate).map(|d| d.full.as_str()),
            Some("1955-04-18")
        );
        assert_eq!(
            record.get(CanonicalField::AgeAtDeath),
            Some(&FieldValue::Age(Known::Value(76)))
        );
    }

    #[test]
    fn test_normalize_birthplace_from_birth_cell() {
        let record = normalize_infobox(&einstein());
        match record.get(CanonicalField::BirthPlace) {
            Some(FieldValue::Place(place)) => {
                assert_eq!(place.country.as_deref(), Some("ドイツ帝国"));
                assert_eq!(place.region.as_deref(), Some("ヴュルテンベルク王国"));
                assert_eq!(place.city.as_deref(), Some("ウルム"));
            }
            other => panic!("unexpected birthplace: {:?}", other),
        }
    }

    #[test]
    fn test_normalize_structured_lists() {
        let record = normalize_infobox(&einstein());

        assert_eq!(
            record.get(CanonicalField::Field),
            Some(&FieldValue::List(vec!["物理学".to_string(), "哲学".to_string()]))
        );
        assert_eq!(
            record.get(CanonicalField::FieldCategory),
            Some(&FieldValue::List(vec!["科学".to_string(), "人文科学".to_string()]))
        );
        match record.get(CanonicalField::Awards) {
            Some(FieldValue::Awards(awards)) => {
                assert_eq!(awards.len(), 2);
                assert_eq!(awards[1].award, "コプリ・メダル");
                assert_eq!(awards[1].year, 1925);
            }
            other => panic!("unexpected awards: {:?}", other),
        }
        assert_eq!(record.family_relations().len(), 4);
        assert_eq!(
            record.uncategorized().get("署名").map(String::as_str),
            Some("Albert Einstein")
        );
    }

    #[test]
    fn test_unparseable_dates_become_sentinel() {
        let raw = RawInfobox::new("無名氏")
            .with_pair("生誕", "不詳")
            .with_pair("死没", "不詳");
        let record = normalize_infobox(&raw);

        let birth = record.date(CanonicalField::BirthDate).unwrap();
        assert_eq!(birth, &DateRecord::unknown());
        assert_eq!(
            record.get(CanonicalField::AgeAtDeath),
            Some(&FieldValue::Age(Known::Unknown))
        );
    }

    #[test]
    fn test_missing_infobox_only_has_name() {
        let record = normalize_infobox(&RawInfobox::new("夏目漱石"));
        assert_eq!(record.subject(), "夏目漱石");
        assert_eq!(
            record.get(CanonicalField::Name),
            Some(&FieldValue::Text("夏目漱石".to_string()))
        );
        assert_eq!(record.get(CanonicalField::BirthDate), None);
    }
}
