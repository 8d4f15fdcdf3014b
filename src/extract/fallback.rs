//! Heuristic extraction from rendered HTML
//!
//! Used when the embedded page data is missing or incomplete. The heuristics
//! are written against the [`PageDocument`] capabilities rather than a concrete
//! HTML library; [`HtmlDocument`] provides them on top of `scraper`.
//!
//! Label matching looks for text such as `Status:` and takes the text of the
//! next element in document order. Founder names are approximated from short
//! text next to any "Founder" mention, which can pick up unrelated text.

use crate::config::SiteConfig;
use crate::extract::fields::ExtractedFields;
use crate::extract::normalize::{coerce_int, points_to_domain};
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::OnceLock;

/// Longest text (in words) accepted as a founder name
const MAX_FOUNDER_NAME_WORDS: usize = 5;

/// Document queries needed by the heuristic extractor
pub trait PageDocument {
    /// Text of the first element following a text node that matches `label`
    fn text_after_label(&self, label: &Regex) -> Option<String>;

    /// Every `href` attribute of every anchor, in document order
    fn links(&self) -> Vec<String>;

    /// For each text node matching `pattern`, the nearest non-blank text
    /// before and after its parent element
    fn texts_beside(&self, pattern: &Regex) -> Vec<String>;
}

/// A parsed HTML page
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(content: &str) -> Self {
        Self {
            html: Html::parse_document(content),
        }
    }
}

/// Joins an element's text pieces, trimming each and skipping blanks
fn stripped_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

impl PageDocument for HtmlDocument {
    fn text_after_label(&self, label: &Regex) -> Option<String> {
        let mut nodes = self.html.tree.root().descendants();
        nodes.find(|node| matches!(node.value(), Node::Text(text) if label.is_match(text)))?;

        let next = nodes.find(|node| node.value().is_element())?;
        let element = ElementRef::wrap(next)?;
        Some(stripped_text(element, "")).filter(|text| !text.is_empty())
    }

    fn links(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        self.html
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string())
            .collect()
    }

    fn texts_beside(&self, pattern: &Regex) -> Vec<String> {
        let mut found = Vec::new();

        for node in self.html.tree.root().descendants() {
            let matched = matches!(node.value(), Node::Text(text) if pattern.is_match(text));
            if !matched {
                continue;
            }
            let Some(parent) = node.parent() else {
                continue;
            };

            let before = parent
                .prev_siblings()
                .find_map(|sib| sibling_text(sib.value(), ElementRef::wrap(sib)));
            let after = parent
                .next_siblings()
                .find_map(|sib| sibling_text(sib.value(), ElementRef::wrap(sib)));
            found.extend(before);
            found.extend(after);
        }

        found
    }
}

/// Text of a sibling node, or `None` if it is blank or not text-bearing
fn sibling_text(node: &Node, element: Option<ElementRef<'_>>) -> Option<String> {
    let text = match (node, element) {
        (Node::Text(text), _) => text.trim().to_string(),
        (Node::Element(_), Some(element)) => stripped_text(element, " "),
        _ => String::new(),
    };
    Some(text).filter(|t| !t.is_empty())
}

struct Patterns {
    primary_partner: Vec<Regex>,
    status: Vec<Regex>,
    location: Vec<Regex>,
    founded: Vec<Regex>,
    team_size: Vec<Regex>,
    batch: Vec<Regex>,
    founder: Regex,
}

fn label_patterns(labels: &[&str]) -> Vec<Regex> {
    labels
        .iter()
        .filter_map(|label| {
            Regex::new(&format!(r"(?i)^\s*{}\s*:?\n?$", regex::escape(label))).ok()
        })
        .collect()
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        primary_partner: label_patterns(&["Primary Partner"]),
        status: label_patterns(&["Status"]),
        location: label_patterns(&["Location"]),
        founded: label_patterns(&["Founded"]),
        team_size: label_patterns(&["Team Size", "Team size"]),
        batch: label_patterns(&["Batch"]),
        founder: Regex::new(r"(?i)founder").expect("founder pattern is valid"),
    })
}

/// Extracts fields from rendered HTML using label and link heuristics
pub fn extract_fallback(html: &str, site: &SiteConfig) -> ExtractedFields {
    extract_from_document(&HtmlDocument::parse(html), site)
}

/// Runs the heuristics against any [`PageDocument`]
pub fn extract_from_document<D: PageDocument + ?Sized>(
    document: &D,
    site: &SiteConfig,
) -> ExtractedFields {
    let patterns = patterns();
    let labelled = |labels: &[Regex]| {
        labels
            .iter()
            .find_map(|label| document.text_after_label(label))
    };

    let links = document.links();

    let website = links
        .iter()
        .find(|href| href.starts_with("http") && !points_to_domain(href, &site.host))
        .cloned();

    let founders_linkedin = links
        .iter()
        .filter(|href| points_to_domain(href, &site.professional_network))
        .cloned()
        .collect();

    let active_founders = document
        .texts_beside(&patterns.founder)
        .into_iter()
        .filter(|text| {
            text.split_whitespace().count() <= MAX_FOUNDER_NAME_WORDS
                && !patterns.founder.is_match(text)
        })
        .collect();

    ExtractedFields {
        website,
        status: labelled(&patterns.status),
        primary_partner: labelled(&patterns.primary_partner),
        founded_year: labelled(&patterns.founded).and_then(|v| coerce_int(&v)),
        team_size: labelled(&patterns.team_size).and_then(|v| coerce_int(&v)),
        batch: labelled(&patterns.batch),
        location: labelled(&patterns.location),
        active_founders,
        founders_linkedin,
    }
}
