//! Per-format text extraction behind a small capability trait.
//!
//! The document loader dispatches by file extension through [`extractor_for`];
//! extensions without a registered extractor are reported as unsupported and
//! skipped by the caller.

use anyhow::{Context, Result};
use pulldown_cmark::{Event, Parser, TagEnd};
use scraper::Html;
use std::path::Path;

/// Capability to turn one source file into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Look up the extractor registered for a lowercase file extension
/// (including the leading dot, e.g. ".md").
pub fn extractor_for(extension: &str) -> Option<&'static dyn TextExtractor> {
    match extension {
        ".txt" => Some(&PlainTextExtractor),
        ".md" => Some(&MarkdownExtractor),
        ".html" => Some(&HtmlExtractor),
        ".pdf" => Some(&PdfExtractor),
        ".py" | ".js" | ".java" | ".cpp" | ".c" => Some(&SourceCodeExtractor),
        _ => None,
    }
}

/// Extensions with a registered extractor, used for directory filtering.
pub const SUPPORTED_EXTENSIONS: [&str; 9] = [
    ".txt", ".md", ".pdf", ".html", ".py", ".js", ".java", ".cpp", ".c",
];

// ─── Plain text ──────────────────────────────────────────

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file {}", path.display()))
    }
}

// ─── Markdown ────────────────────────────────────────────

/// Renders markdown to plain text: inline markup is dropped, block
/// boundaries become paragraph breaks.
pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read markdown file {}", path.display()))?;
        Ok(markdown_to_text(&content))
    }
}

fn markdown_to_text(content: &str) -> String {
    let mut text = String::with_capacity(content.len());
    for event in Parser::new(content) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::BlockQuote(_),
            ) => text.push_str("\n\n"),
            _ => {}
        }
    }
    text
}

// ─── HTML ────────────────────────────────────────────────

/// Strips tags and returns the document's visible text.
pub struct HtmlExtractor;

impl TextExtractor for HtmlExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read HTML file {}", path.display()))?;
        Ok(html_to_text(&content))
    }
}

fn html_to_text(content: &str) -> String {
    let document = Html::parse_document(content);
    let mut text = String::new();
    for piece in document.root_element().text() {
        let piece = piece.trim();
        if !piece.is_empty() {
            text.push_str(piece);
            text.push('\n');
        }
    }
    text
}

// ─── PDF ─────────────────────────────────────────────────

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        pdf_extract::extract_text(path)
            .with_context(|| format!("Failed to extract PDF text from {}", path.display()))
    }
}

// ─── Source code ─────────────────────────────────────────

/// Source files are indexed verbatim; the cleaner handles normalization.
pub struct SourceCodeExtractor;

impl TextExtractor for SourceCodeExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read source file {}", path.display()))
    }
}
