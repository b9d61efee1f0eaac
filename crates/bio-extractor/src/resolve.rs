//! Fuzzy person-name resolution
//!
//! Mentions are matched back to canonical names by exact lookup first, then
//! by partial-ratio similarity.

use std::collections::HashMap;

use bio_core::EntityCounts;

/// Levenshtein distance over characters
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn char_ratio(a: &[char], b: &[char]) -> f64 {
    let max_len = a.len().max(b.len());
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Normalized similarity in `[0, 1]`; empty input scores 0
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    char_ratio(&a, &b)
}

/// Best `ratio` of the shorter string against every equal-length window of
/// the longer one
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0.0;
    }

    long.windows(short.len())
        .map(|window| char_ratio(&short, window))
        .fold(0.0, f64::max)
}

/// Maps name mentions to canonical person names
#[derive(Debug, Clone)]
pub struct NameResolver {
    threshold: f64,
    /// Canonical names in priority order
    canonical: Vec<String>,
    /// Surface form -> canonical name
    aliases: HashMap<String, String>,
}

impl NameResolver {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            canonical: Vec::new(),
            aliases: HashMap::new(),
        }
    }

    /// Register a name; it joins an existing canonical name when similar enough.
    ///
    /// Returns the canonical name the surface now resolves to.
    pub fn insert(&mut self, surface: &str) -> String {
        let surface = surface.trim();
        if let Some(canonical) = self.resolve(surface) {
            let canonical = canonical.to_string();
            self.aliases
                .entry(surface.to_string())
                .or_insert_with(|| canonical.clone());
            return canonical;
        }
        self.canonical.push(surface.to_string());
        self.aliases
            .insert(surface.to_string(), surface.to_string());
        surface.to_string()
    }

    /// Build from person frequencies; the most frequent name of a cluster is canonical
    pub fn from_counts(counts: &EntityCounts, threshold: f64) -> Self {
        Self::new(threshold).with_counts(counts)
    }

    /// Register names ahead of any counted ones so they stay canonical
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            if !name.as_ref().trim().is_empty() {
                self.insert(name.as_ref());
            }
        }
        self
    }

    /// Register counted person names, most frequent first
    pub fn with_counts(mut self, counts: &EntityCounts) -> Self {
        for (name, _) in counts.persons_by_frequency() {
            self.insert(name);
        }
        self
    }

    /// Canonical name for a mention, or `None` when nothing is similar enough
    pub fn resolve(&self, mention: &str) -> Option<&str> {
        let mention = mention.trim();
        if mention.is_empty() {
            return None;
        }
        if let Some(canonical) = self.aliases.get(mention) {
            return Some(canonical.as_str());
        }

        let mut best: Option<(&str, f64)> = None;
        for name in &self.canonical {
            let score = partial_ratio(mention, name);
            if score >= self.threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((name.as_str(), score));
            }
        }
        best.map(|(name, _)| name)
    }

    pub fn canonical_names(&self) -> &[String] {
        &self.canonical
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bio_core::EntityCategory;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("ボーア", "ボーア"), 1.0);
        assert_eq!(ratio("", "ボーア"), 0.0);
        assert!((ratio("ボーア", "ボルン") - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_ratio_substring() {
        assert_eq!(partial_ratio("アインシュタイン", "アルベルト・アインシュタイン"), 1.0);
        assert_eq!(partial_ratio("アルベルト・アインシュタイン", "アインシュタイン"), 1.0);
        assert_eq!(partial_ratio("", "アインシュタイン"), 0.0);
    }

    #[test]
    fn test_fuzzy_merge_and_split() {
        let mut counts = EntityCounts::new();
        for _ in 0..3 {
            counts.increment(EntityCategory::Person, "アルベルト・アインシュタイン");
        }
        counts.increment(EntityCategory::Person, "アインシュタイン");
        counts.increment(EntityCategory::Person, "ボーア");
        counts.increment(EntityCategory::Person, "ボルン");

        let resolver = NameResolver::from_counts(&counts, 0.8);

        assert_eq!(
            resolver.resolve("アインシュタイン"),
            Some("アルベルト・アインシュタイン")
        );
        assert_eq!(resolver.resolve("ボーア"), Some("ボーア"));
        assert_eq!(resolver.resolve("ボルン"), Some("ボルン"));
        assert_eq!(resolver.canonical_names().len(), 3);
    }

    #[test]
    fn test_unmatched_mention() {
        let mut resolver = NameResolver::new(0.8);
        resolver.insert("ミレヴァ・マリッチ");
        assert_eq!(resolver.resolve("プランク"), None);
        assert_eq!(resolver.resolve(""), None);
    }

    #[test]
    fn test_preferred_names_stay_canonical() {
        let mut counts = EntityCounts::new();
        counts.increment(EntityCategory::Person, "アインシュタイン");
        counts.increment(EntityCategory::Person, "アインシュタイン");

        let resolver = NameResolver::new(0.8)
            .with_names(["アルベルト・アインシュタイン", ""])
            .with_counts(&counts);

        assert_eq!(
            resolver.resolve("アインシュタイン"),
            Some("アルベルト・アインシュタイン")
        );
        assert_eq!(resolver.canonical_names().len(), 1);
    }

    #[test]
    fn test_insert_returns_canonical() {
        let mut resolver = NameResolver::new(0.8);
        assert_eq!(resolver.insert("ハンス・アルベルト・アインシュタイン"), "ハンス・アルベルト・アインシュタイン");
        assert_eq!(resolver.insert("ハンス・アルベルト"), "ハンス・アルベルト・アインシュタイン");
        assert_eq!(resolver.threshold(), 0.8);
    }
}
