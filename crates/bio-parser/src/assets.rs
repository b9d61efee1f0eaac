//! Page assets: embedded images and category names

use bio_core::PageImage;

use crate::document::selector;
use crate::WikiPage;

/// Category names containing these are maintenance categories
const MAINTENANCE_MARKERS: &[&str] = &["記事", "テキスト"];

/// Every `img` in the article body with its `src` and `alt`
pub fn extract_images(page: &WikiPage) -> Vec<PageImage> {
    let img = selector("img");
    page.content_root()
        .select(&img)
        .filter_map(|element| {
            let src = element.value().attr("src")?.trim();
            (!src.is_empty()).then(|| PageImage {
                src: src.to_string(),
                alt: element.value().attr("alt").unwrap_or_default().trim().to_string(),
            })
        })
        .collect()
}

/// Drop empty and maintenance categories, keeping first occurrences
pub fn filter_categories(categories: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for category in categories.iter().map(|c| c.trim()) {
        if category.is_empty()
            || MAINTENANCE_MARKERS.iter().any(|marker| category.contains(marker))
            || kept.iter().any(|k| k == category)
        {
            continue;
        }
        kept.push(category.to_string());
    }
    kept
}
