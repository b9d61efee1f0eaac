//! Parsed article document and shared text collection

use std::path::Path;

use scraper::node::{Element, Node};
use scraper::{ElementRef, Html, Selector};

use crate::{ParserError, Result};

/// Tags whose content never reaches section or cell text
const IGNORE_TAGS: &[&str] = &[
    "script", "style", "sup", "noscript", "form", "input", "link", "meta", "button",
];

const IGNORE_CLASSES: &[&str] = &[
    "mw-editsection",
    "mw-editsection-bracket",
    "reference",
    "toccolours",
    "navbox",
    "navbox-styles",
    "vertical-navbox",
    "infobox",
    "toc",
    "catlinks",
    "mw-empty-elt",
    "noprint",
    "hatnote",
    "dablink",
    "ambox",
    "metadata",
    "mw-jump-link",
];

/// Tags that separate words when flattened to text
const BREAK_TAGS: &[&str] = &[
    "br", "p", "div", "li", "dd", "dt", "tr", "td", "th", "blockquote", "ul", "ol", "dl",
];

const CONTENT_ROOT_SELECTORS: &[&str] = &[
    "#mw-content-text .mw-parser-output",
    "#mw-content-text",
    "#bodyContent .mw-parser-output",
    "#bodyContent",
    "body .mw-parser-output",
    ".mw-parser-output",
    "body",
];

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// One fetched article, parsed once
pub struct WikiPage {
    title: String,
    document: Html,
}

impl std::fmt::Debug for WikiPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiPage").field("title", &self.title).finish()
    }
}

impl WikiPage {
    /// Parse article HTML. Empty input means the page was never fetched.
    pub fn parse(title: impl Into<String>, html: &str) -> Result<Self> {
        let title = title.into();
        if html.trim().is_empty() {
            return Err(ParserError::ContentNotFetched(title));
        }
        tracing::debug!("Parsing page {} ({} bytes)", title, html.len());
        Ok(Self {
            title,
            document: Html::parse_document(html),
        })
    }

    /// Parse a saved page; the title defaults to the file stem
    pub fn from_file(path: impl AsRef<Path>, title: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let html = std::fs::read_to_string(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        let title = match title {
            Some(title) => title.to_string(),
            None => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        Self::parse(title, &html)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// The article body container, falling back to the document root
    pub fn content_root(&self) -> ElementRef<'_> {
        for css in CONTENT_ROOT_SELECTORS {
            if let Some(root) = self.document.select(&selector(css)).next() {
                return root;
            }
        }
        self.document.root_element()
    }

    /// Category links embedded at the bottom of the page
    pub fn categories(&self) -> Vec<String> {
        let links = selector("#mw-normal-catlinks li a, .mw-normal-catlinks li a");
        self.document
            .select(&links)
            .map(|a| a.text().collect::<String>().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

pub(crate) fn should_ignore_element(element: &Element) -> bool {
    let tag = element.name();
    if tag == "body" || tag == "html" {
        return false;
    }
    IGNORE_TAGS.contains(&tag) || element.classes().any(|class| IGNORE_CLASSES.contains(&class))
}

pub(crate) fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Append the visible text under `element`, skipping decorative markup
pub(crate) fn collect_text(element: ElementRef<'_>, out: &mut String) {
    if should_ignore_element(element.value()) {
        return;
    }
    let breaks = BREAK_TAGS.contains(&element.value().name());
    if breaks {
        out.push(' ');
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
    if breaks {
        out.push(' ');
    }
}

/// Visible text of `element` with surrounding whitespace trimmed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_html_is_not_fetched() {
        let err = WikiPage::parse("夏目漱石", "  ").unwrap_err();
        assert!(matches!(err, ParserError::ContentNotFetched(ref title) if title == "夏目漱石"));
    }

    #[test]
    fn test_content_root_prefers_parser_output() {
        let html = r#"<html><body><div id="mw-content-text"><div class="mw-parser-output"><p>本文</p></div></div><p>外</p></body></html>"#;
        let page = WikiPage::parse("テスト", html).unwrap();
        assert_eq!(element_text(page.content_root()), "本文");
    }

    #[test]
    fn test_collect_text_skips_decorations() {
        let html = r#"<div id="mw-content-text"><p>ウルム<sup class="reference">[1]</sup>で生まれた<span class="mw-editsection">[編集]</span>。<br>翌年<style>.x{}</style>移住</p></div>"#;
        let page = WikiPage::parse("テスト", html).unwrap();
        let text = element_text(page.content_root());
        assert_eq!(text.split_whitespace().collect::<Vec<_>>(), vec!["ウルムで生まれた。", "翌年移住"]);
    }

    #[test]
    fn test_categories_from_catlinks() {
        let html = r#"<body><div id="mw-content-text"><p>x</p></div>
            <div id="catlinks"><div id="mw-normal-catlinks"><ul>
            <li><a href="/wiki/a">ドイツの物理学者</a></li>
            <li><a href="/wiki/b">ノーベル物理学賞受賞者</a></li>
            </ul></div></div></body>"#;
        let page = WikiPage::parse("テスト", html).unwrap();
        assert_eq!(page.categories(), vec!["ドイツの物理学者", "ノーベル物理学賞受賞者"]);
    }

    #[test]
    fn test_from_file_uses_stem_as_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("アルベルト・アインシュタイン.html");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "<p>本文</p>").unwrap();

        let page = WikiPage::from_file(&path, None).unwrap();
        assert_eq!(page.title(), "アルベルト・アインシュタイン");

        let missing = WikiPage::from_file(dir.path().join("missing.html"), None);
        assert!(matches!(missing, Err(ParserError::IoError { .. })));
    }
}
