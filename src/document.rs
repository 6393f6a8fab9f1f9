//! Structural queries over a parsed result page.
//!
//! The extractor only talks to [`DocumentQuery`], so the selector engine is a
//! detail of [`PanelDocument`]. Patterns are CSS selectors as understood by the
//! `scraper` crate.

use std::collections::HashSet;

use log::warn;
use scraper::{ElementRef, Html, Selector};

pub trait DocumentQuery {
    /// Text nodes beneath every element matching `pattern`, in document order.
    fn select_text(&self, pattern: &str) -> Vec<String>;

    /// Text nodes that are direct children of matching elements.
    fn select_own_text(&self, pattern: &str) -> Vec<String>;

    /// Values of `attr` on matching elements that carry it.
    fn select_attribute(&self, pattern: &str, attr: &str) -> Vec<String>;
}

pub struct PanelDocument {
    html: Html,
}

impl PanelDocument {
    pub fn parse(body: &str) -> Self {
        PanelDocument {
            html: Html::parse_document(body),
        }
    }

    fn matches(&self, pattern: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(pattern) {
            Ok(selector) => self.html.select(&selector).collect(),
            Err(e) => {
                warn!("Skipping unparsable selector '{}': {}", pattern, e);
                Vec::new()
            }
        }
    }

    /// Drops matches nested inside another match so their text is not read twice.
    fn outermost<'a>(elements: Vec<ElementRef<'a>>) -> Vec<ElementRef<'a>> {
        let ids: HashSet<_> = elements.iter().map(|e| e.id()).collect();
        elements
            .into_iter()
            .filter(|e| !e.ancestors().any(|a| ids.contains(&a.id())))
            .collect()
    }
}

impl DocumentQuery for PanelDocument {
    fn select_text(&self, pattern: &str) -> Vec<String> {
        Self::outermost(self.matches(pattern))
            .into_iter()
            .flat_map(|e| e.text())
            .map(str::to_string)
            .collect()
    }

    fn select_own_text(&self, pattern: &str) -> Vec<String> {
        let ids: HashSet<_> = self.matches(pattern).iter().map(|e| e.id()).collect();
        if ids.is_empty() {
            return Vec::new();
        }
        // Walk the whole tree so nested matches interleave in document order.
        self.html
            .tree
            .root()
            .descendants()
            .filter(|node| node.parent().map_or(false, |p| ids.contains(&p.id())))
            .filter_map(|node| node.value().as_text().map(|t| t.text.to_string()))
            .collect()
    }

    fn select_attribute(&self, pattern: &str, attr: &str) -> Vec<String> {
        self.matches(pattern)
            .into_iter()
            .filter_map(|e| e.value().attr(attr).map(str::to_string))
            .collect()
    }
}
