//! Markdown rendering
//!
//! Markdown to HTML conversion for post bodies and offering descriptions.
//! Content is written by trusted console users, so the output is not
//! sanitized beyond what pulldown-cmark itself escapes.
//!
//! # Example
//!
//! ```
//! use brightfold::services::markdown::MarkdownRenderer;
//!
//! let renderer = MarkdownRenderer::new();
//! let html = renderer.render("# Hello\n\nThis is **bold** text.");
//! assert!(html.contains("<h1>"));
//! assert!(html.contains("<strong>"));
//! ```

use pulldown_cmark::{html, Options, Parser};

/// A thread-safe Markdown renderer.
///
/// Enables tables, strikethrough, task lists, footnotes, and smart
/// punctuation on top of CommonMark.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// Create a new renderer
    pub fn new() -> Self {
        Self
    }

    /// Render markdown to an HTML string
    pub fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);

        let parser = Parser::new_ext(markdown, options);
        let mut output = String::with_capacity(markdown.len() * 2);
        html::push_html(&mut output, parser);
        output
    }

    /// Derive a plain-text excerpt from markdown, truncated at a word
    /// boundary near `max_chars`.
    pub fn excerpt(&self, markdown: &str, max_chars: usize) -> String {
        let mut text = String::new();
        for event in Parser::new(markdown) {
            match event {
                pulldown_cmark::Event::Text(t) | pulldown_cmark::Event::Code(t) => {
                    if !text.is_empty() && !text.ends_with(' ') {
                        text.push(' ');
                    }
                    text.push_str(&t);
                }
                _ => {}
            }
            if text.len() > max_chars + 32 {
                break;
            }
        }

        let text = text.trim();
        if text.chars().count() <= max_chars {
            return text.to_string();
        }

        let truncated: String = text.chars().take(max_chars).collect();
        match truncated.rfind(' ') {
            Some(idx) => format!("{}…", &truncated[..idx]),
            None => format!("{}…", truncated),
        }
    }
}
