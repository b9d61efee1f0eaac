//! Section extraction
//!
//! The article body is first flattened into an immutable list of blocks
//! (headings and content). A recursive descent over that list builds the
//! heading tree: a heading owns every following block until the next heading
//! whose level is the same or shallower. The tree is then flattened back into
//! reading order with each section's ancestor path.

use bio_core::config::ExtractionConfig;
use bio_core::Section;
use bio_normalizer::TextNormalizer;
use scraper::ElementRef;

use crate::document::{element_text, has_class, should_ignore_element};
use crate::WikiPage;

/// Paragraph-like content; everything else is appended after it
const PRIMARY_TAGS: &[&str] = &["p", "blockquote", "h5", "h6"];

/// Containers searched for nested headings instead of being read as one block
const WRAPPER_TAGS: &[&str] = &["section", "div"];

// ============================================================================
// Blocks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Priority {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Heading { level: u8, text: String },
    Content { priority: Priority, text: String },
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        _ => None,
    }
}

fn is_heading_wrapper(element: &ElementRef<'_>) -> bool {
    element.value().name() == "div" && has_class(element, "mw-heading")
}

fn contains_heading(element: &ElementRef<'_>) -> bool {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|e| heading_level(e.value().name()).is_some())
}

fn heading_in(element: ElementRef<'_>) -> Option<Block> {
    if let Some(level) = heading_level(element.value().name()) {
        return Some(Block::Heading {
            level,
            text: element_text(element),
        });
    }
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find_map(|child| {
            heading_level(child.value().name()).map(|level| Block::Heading {
                level,
                text: element_text(child),
            })
        })
}

/// Flatten the body under `parent` into blocks in document order
fn collect_blocks(parent: ElementRef<'_>, blocks: &mut Vec<Block>) {
    for child in parent.children().filter_map(ElementRef::wrap) {
        if should_ignore_element(child.value()) {
            continue;
        }
        let tag = child.value().name();

        if heading_level(tag).is_some() || is_heading_wrapper(&child) {
            if let Some(heading) = heading_in(child) {
                blocks.push(heading);
            }
            continue;
        }

        if WRAPPER_TAGS.contains(&tag) && contains_heading(&child) {
            collect_blocks(child, blocks);
            continue;
        }

        let text = element_text(child);
        if text.is_empty() {
            continue;
        }
        let priority = if PRIMARY_TAGS.contains(&tag) {
            Priority::Primary
        } else {
            Priority::Secondary
        };
        blocks.push(Block::Content { priority, text });
    }
}

// ============================================================================
// Section tree
// ============================================================================

#[derive(Debug, Clone, Default)]
struct SectionNode {
    heading: Option<String>,
    primary: Vec<String>,
    secondary: Vec<String>,
    children: Vec<SectionNode>,
}

impl SectionNode {
    fn blocks(&self) -> impl Iterator<Item = &String> {
        self.primary.iter().chain(self.secondary.iter())
    }
}

/// Build the node that starts at `blocks[0]` (after its heading) and owns
/// blocks until a heading at `stop_level` or shallower. Returns the node
/// and the number of blocks consumed.
fn descend(blocks: &[Block], heading: Option<String>, stop_level: u8) -> (SectionNode, usize) {
    let mut node = SectionNode {
        heading,
        ..Default::default()
    };
    let mut pos = 0;

    while pos < blocks.len() {
        match &blocks[pos] {
            Block::Heading { level, .. } if *level <= stop_level => break,
            Block::Heading { level, text } => {
                let (child, consumed) = descend(&blocks[pos + 1..], Some(text.clone()), *level);
                node.children.push(child);
                pos += consumed + 1;
            }
            Block::Content { priority, text } => {
                match priority {
                    Priority::Primary => node.primary.push(text.clone()),
                    Priority::Secondary => node.secondary.push(text.clone()),
                }
                pos += 1;
            }
        }
    }

    (node, pos)
}

fn build_tree(blocks: &[Block]) -> SectionNode {
    // No heading has level 1 in the body, so the root owns every block
    descend(blocks, None, 1).0
}

// ============================================================================
// Extractor
// ============================================================================

/// Builds flattened [`Section`] lists from parsed pages
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    excluded_keywords: Vec<String>,
    emit_fragments: bool,
    include_lead: bool,
    normalizer: TextNormalizer,
}

impl SectionExtractor {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            excluded_keywords: config.excluded_section_keywords.clone(),
            emit_fragments: config.emit_fragments,
            include_lead: config.include_lead,
            normalizer: TextNormalizer::new().with_exclude_words(config.exclude_words.clone()),
        }
    }

    pub fn with_excluded_keywords(mut self, keywords: Vec<String>) -> Self {
        self.excluded_keywords = keywords;
        self
    }

    pub fn with_fragments(mut self, emit: bool) -> Self {
        self.emit_fragments = emit;
        self
    }

    pub fn with_lead(mut self, include: bool) -> Self {
        self.include_lead = include;
        self
    }

    /// Sections of the article body in reading order
    pub fn extract(&self, page: &WikiPage) -> Vec<Section> {
        let mut blocks = Vec::new();
        collect_blocks(page.content_root(), &mut blocks);

        let root = build_tree(&blocks);
        let mut sections = Vec::new();

        if self.include_lead {
            let lead = self.join_blocks(root.blocks());
            if !lead.is_empty() {
                sections.push(Section::new(Vec::new(), None, lead));
            }
        }
        for child in &root.children {
            self.flatten(child, &[], &mut sections);
        }

        let total = sections.len();
        sections.retain(|section| !self.is_excluded(section));
        tracing::debug!(
            "Extracted {} sections from {} ({} excluded)",
            sections.len(),
            page.title(),
            total - sections.len()
        );
        sections
    }

    fn flatten(&self, node: &SectionNode, path: &[String], out: &mut Vec<Section>) {
        let heading = node
            .heading
            .as_deref()
            .map(|text| self.normalizer.normalize(text))
            .unwrap_or_default();
        let text = self.join_blocks(node.blocks());
        out.push(Section::new(path.to_vec(), Some(heading.clone()), text));

        let mut child_path = path.to_vec();
        child_path.push(heading);

        if self.emit_fragments {
            for block in node.blocks() {
                let text = self.normalizer.normalize(block);
                if !text.is_empty() {
                    out.push(Section::fragment(child_path.clone(), text));
                }
            }
        }

        for child in &node.children {
            self.flatten(child, &child_path, out);
        }
    }

    fn join_blocks<'a>(&self, blocks: impl Iterator<Item = &'a String>) -> String {
        let joined = blocks.map(String::as_str).collect::<Vec<_>>().join(" ");
        self.normalizer.normalize(&joined)
    }

    /// A section is dropped when its nearest heading contains a keyword
    fn is_excluded(&self, section: &Section) -> bool {
        section.nearest_heading().is_some_and(|heading| {
            self.excluded_keywords
                .iter()
                .any(|keyword| !keyword.is_empty() && heading.contains(keyword.as_str()))
        })
    }
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new()
    }
}
