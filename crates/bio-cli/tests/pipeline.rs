//! End-to-end tests over a saved article

use bio_cli::{write_dump, Pipeline, Profile};
use bio_core::config::AppConfig;
use bio_core::{BioError, CanonicalField, RelationKind, TimelineYear, TurningPointCategory};
use pretty_assertions::assert_eq;

const EINSTEIN: &str = include_str!("fixtures/einstein.html");

fn profile() -> Profile {
    Pipeline::new(&AppConfig::default())
        .process_html("アルベルト・アインシュタイン", EINSTEIN, None)
        .unwrap()
}

#[test]
fn test_sections_and_exclusion() {
    let profile = profile();

    let headings: Vec<Option<&str>> = profile
        .sections
        .iter()
        .map(|s| s.heading_text.as_deref())
        .collect();
    assert_eq!(
        headings,
        vec![None, Some("生涯"), Some("幼少期"), Some("スイス時代"), Some("評価")]
    );

    let lead = &profile.sections[0];
    assert_eq!(lead.heading_level, 2);
    assert!(lead.text.starts_with("アルベルト・アインシュタインは"));
    assert!(!lead.text.contains("[2]"));

    for section in &profile.sections {
        assert_eq!(section.category_texts.len() + 2, usize::from(section.heading_level));
    }
    assert_eq!(profile.sections[2].category_texts, vec!["生涯"]);
}

#[test]
fn test_infobox_record() {
    let profile = profile();

    assert_eq!(profile.subject, "アルベルト・アインシュタイン");
    assert_eq!(
        profile
            .infobox
            .date(CanonicalField::BirthDate)
            .map(|d| d.full.as_str()),
        Some("1879-03-14")
    );
    assert_eq!(
        profile
            .infobox
            .date(CanonicalField::DeathDate)
            .map(|d| d.full.as_str()),
        Some("1955-04-18")
    );
    assert_eq!(profile.infobox.family_relations().len(), 3);
}

#[test]
fn test_timeline() {
    let profile = profile();

    let years: Vec<TimelineYear> = profile.timeline.iter().map(|e| e.year.clone()).collect();
    assert_eq!(
        years,
        [1879, 1880, 1896, 1903, 1905, 1922].map(TimelineYear::Year).to_vec()
    );
    assert_eq!(profile.timeline[0].date, "1879年3月14日");

    let periods: Vec<(i32, i32)> = profile
        .analysis
        .activity_periods
        .iter()
        .map(|p| (p.start, p.end))
        .collect();
    assert_eq!(periods, vec![(1879, 1880), (1896, 1896), (1903, 1905), (1922, 1922)]);

    assert!(profile.analysis.turning_points.iter().any(|tp| {
        tp.year == TimelineYear::Year(1896) && tp.category == TurningPointCategory::CareerChange
    }));
}

#[test]
fn test_achievements() {
    let profile = profile();

    let found: Vec<(&str, Option<i32>)> = profile
        .achievements
        .iter()
        .map(|a| (a.period.as_str(), a.age))
        .collect();
    assert_eq!(found, vec![("1905年", Some(26)), ("1922年", Some(43))]);
}

#[test]
fn test_relationship_graph() {
    let profile = profile();
    let related = &profile.network.related_persons;

    for name in [
        "ミレヴァ・マリッチ",
        "エルザ・レーベンタール",
        "ハンス・アルベルト",
        "ヘルマン・アインシュタイン",
        "パウリーネ・コッホ",
        "ニールス・ボーア",
    ] {
        assert!(related.iter().any(|r| r == name), "missing neighbor {}", name);
    }

    let spouses = &profile.network.relations_by_type[&RelationKind::Label("配偶者".to_string())];
    assert_eq!(spouses, &vec!["エルザ・レーベンタール", "ミレヴァ・マリッチ"]);
    assert!(profile
        .relations
        .iter()
        .any(|r| r.relation == RelationKind::Spouse && r.target == "ミレヴァ・マリッチ"));

    let degree = &profile.graph.centrality.degree_centrality;
    let hub = degree["アルベルト・アインシュタイン"];
    assert!(degree.values().all(|score| *score <= hub));
}

#[test]
fn test_assets() {
    let profile = profile();

    assert_eq!(profile.images.len(), 1);
    assert_eq!(profile.images[0].alt, "1921年のアインシュタイン");
    assert_eq!(
        profile.categories,
        vec!["ドイツの物理学者", "ノーベル物理学賞受賞者"]
    );
}

#[test]
fn test_given_categories_override_catlinks() {
    let categories = vec!["理論物理学者".to_string(), "リダイレクトの記事".to_string()];
    let profile = Pipeline::new(&AppConfig::default())
        .process_html("アルベルト・アインシュタイン", EINSTEIN, Some(&categories))
        .unwrap();
    assert_eq!(profile.categories, vec!["理論物理学者"]);
}

#[test]
fn test_missing_html_is_an_error() {
    let err = Pipeline::new(&AppConfig::default())
        .process_html("空ページ", "  ", None)
        .unwrap_err();
    assert!(matches!(err, BioError::MissingInput(_)));
}

#[test]
fn test_year_range_filter() {
    let profile = Pipeline::new(&AppConfig::default())
        .with_range(Some(1900), Some(1910))
        .process_html("アルベルト・アインシュタイン", EINSTEIN, None)
        .unwrap();

    let filtered: Vec<Option<i32>> = profile
        .analysis
        .filtered_events
        .iter()
        .map(|e| e.year.as_year())
        .collect();
    assert_eq!(filtered, vec![Some(1903), Some(1905)]);
    assert_eq!(profile.timeline.len(), 6);
}

#[test]
fn test_profile_dump() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dump(dir.path(), "profile", &profile(), true).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["subject"], "アルベルト・アインシュタイン");
    assert!(json["graph"]["centrality"]["betweenness_centrality"].is_object());
    assert_eq!(json["infobox"]["fields"]["birth_date"]["full"], "1879-03-14");
}
