//! Markdown → HTML fragment.
//!
//! comrak parses the source into an AST; a single walk then rewrites the
//! nodes the enabled extensions care about before the tree is formatted:
//!
//! - **codehilite**: fenced code blocks become inline-styled syntect HTML.
//!   Inline styles matter here because the fragment ends up in a standalone
//!   document with no highlight stylesheet.
//! - **toc**: headings get stable `id` anchors and a paragraph holding only
//!   `[TOC]` becomes a nested link list.
//!
//! Raw HTML in the source passes through untouched.

use crate::config::MarkdownExtension;
use crate::error::Md2ImgError;
use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use comrak::options::Options;
use comrak::{format_html, parse_document, Arena};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use tracing::{debug, warn};

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEMES: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

const HIGHLIGHT_THEME: &str = "InspiredGitHub";
const TOC_MARKER: &str = "[TOC]";

/// Render `markdown` to an HTML body fragment with the given extensions.
pub fn markdown_to_html(
    markdown: &str,
    extensions: &[MarkdownExtension],
) -> Result<String, Md2ImgError> {
    MarkdownRenderer::new(extensions).render(markdown)
}

/// A configured Markdown renderer. Cheap to build; holds no per-document state.
pub struct MarkdownRenderer {
    options: Options<'static>,
    highlight: bool,
    toc: bool,
}

impl MarkdownRenderer {
    pub fn new(extensions: &[MarkdownExtension]) -> Self {
        let mut options = Options::default();
        let mut highlight = false;
        let mut toc = false;

        let ext = &mut options.extension;
        for extension in extensions {
            match extension {
                MarkdownExtension::Extra => {
                    ext.table = true;
                    ext.footnotes = true;
                    ext.description_lists = true;
                    ext.strikethrough = true;
                }
                MarkdownExtension::CodeHilite => highlight = true,
                MarkdownExtension::Toc => toc = true,
                MarkdownExtension::Tables => ext.table = true,
                MarkdownExtension::Footnotes => ext.footnotes = true,
                MarkdownExtension::Strikethrough => ext.strikethrough = true,
                MarkdownExtension::Tasklist => ext.tasklist = true,
                MarkdownExtension::Autolink => ext.autolink = true,
            }
        }

        let render = &mut options.render;
        render.r#unsafe = true;
        render.github_pre_lang = false;

        Self {
            options,
            highlight,
            toc,
        }
    }

    pub fn render(&self, markdown: &str) -> Result<String, Md2ImgError> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);

        let mut walker = RewriteWalker {
            renderer: self,
            headings: Vec::new(),
            slugs: HashMap::new(),
            toc_markers: Vec::new(),
        };
        walker.visit(root)?;

        if !walker.toc_markers.is_empty() {
            let toc = toc_html(&walker.headings);
            for marker in &walker.toc_markers {
                replace_with_html_block(marker, toc.clone());
            }
        }

        let mut html = String::new();
        format_html(root, &self.options, &mut html)
            .map_err(|e| Md2ImgError::Internal(format!("Markdown formatting failed: {e}")))?;
        debug!(
            "Markdown rendered: {} bytes in, {} bytes out, {} headings",
            markdown.len(),
            html.len(),
            walker.headings.len()
        );
        Ok(html)
    }
}

// ── AST rewrite ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct TocEntry {
    level: u8,
    slug: String,
    text: String,
}

struct RewriteWalker<'r, 'a> {
    renderer: &'r MarkdownRenderer,
    headings: Vec<TocEntry>,
    slugs: HashMap<String, usize>,
    toc_markers: Vec<&'a AstNode<'a>>,
}

impl<'r, 'a> RewriteWalker<'r, 'a> {
    fn visit(&mut self, node: &'a AstNode<'a>) -> Result<(), Md2ImgError> {
        if self.renderer.toc {
            if let Some(level) = heading_level(node) {
                return self.anchor_heading(node, level);
            }
            if is_toc_marker(node) {
                self.toc_markers.push(node);
                return Ok(());
            }
        }

        if self.renderer.highlight {
            if let Some((info, literal)) = extract_code_block(node) {
                let language = info.split_whitespace().next();
                replace_with_html_block(node, highlight_code(language, &literal));
                return Ok(());
            }
        }

        let mut child = node.first_child();
        while let Some(next) = child {
            self.visit(next)?;
            child = next.next_sibling();
        }
        Ok(())
    }

    /// Render the heading on its own and re-insert it with an `id`.
    fn anchor_heading(&mut self, node: &'a AstNode<'a>, level: u8) -> Result<(), Md2ImgError> {
        let text = collect_inline_text(node)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let slug = self.unique_slug(&text);

        let mut html = String::new();
        format_html(node, &self.renderer.options, &mut html)
            .map_err(|e| Md2ImgError::Internal(format!("Heading formatting failed: {e}")))?;
        let open = format!("<h{level}>");
        let html = html.replacen(&open, &format!("<h{level} id=\"{slug}\">"), 1);

        replace_with_html_block(node, html);
        self.headings.push(TocEntry { level, slug, text });
        Ok(())
    }

    /// Slugify `text`, suffixing `_1`, `_2`, … on repeats.
    fn unique_slug(&mut self, text: &str) -> String {
        let mut base = slug::slugify(text);
        if base.is_empty() {
            base = "section".to_string();
        }
        let seen = self.slugs.entry(base.clone()).or_insert(0);
        let slug = if *seen == 0 {
            base
        } else {
            format!("{base}_{seen}")
        };
        *seen += 1;
        slug
    }
}

fn replace_with_html_block<'a>(node: &'a AstNode<'a>, literal: String) {
    let mut children = Vec::new();
    let mut child = node.first_child();
    while let Some(next) = child {
        children.push(next);
        child = next.next_sibling();
    }
    for c in children {
        c.detach();
    }

    let mut data = node.data.borrow_mut();
    data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
        block_type: 0,
        literal,
    });
}

fn heading_level(node: &AstNode<'_>) -> Option<u8> {
    let data = node.data.borrow();
    if let NodeValue::Heading(heading) = &data.value {
        Some(heading.level)
    } else {
        None
    }
}

fn extract_code_block(node: &AstNode<'_>) -> Option<(String, String)> {
    let data = node.data.borrow();
    if let NodeValue::CodeBlock(block) = &data.value {
        Some((block.info.trim().to_string(), block.literal.clone()))
    } else {
        None
    }
}

/// A paragraph whose only content is the literal `[TOC]` marker.
fn is_toc_marker<'a>(node: &'a AstNode<'a>) -> bool {
    if !matches!(node.data.borrow().value, NodeValue::Paragraph) {
        return false;
    }
    let all_text = node
        .children()
        .all(|c| matches!(c.data.borrow().value, NodeValue::Text(_)));
    all_text && collect_inline_text(node).trim() == TOC_MARKER
}

fn collect_inline_text<'a>(node: &'a AstNode<'a>) -> String {
    fn walk<'a>(node: &'a AstNode<'a>, buffer: &mut String) {
        {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Text(text) => buffer.push_str(text),
                NodeValue::Code(code) => buffer.push_str(&code.literal),
                NodeValue::LineBreak | NodeValue::SoftBreak => buffer.push(' '),
                _ => {}
            }
        }
        for child in node.children() {
            walk(child, buffer);
        }
    }

    let mut text = String::new();
    for child in node.children() {
        walk(child, &mut text);
    }
    text
}

// ── Highlighting ─────────────────────────────────────────────────────────

fn highlight_code(language: Option<&str>, code: &str) -> String {
    let syntax = language
        .and_then(find_syntax)
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());

    let Some(theme) = THEMES.themes.get(HIGHLIGHT_THEME) else {
        warn!("Highlight theme '{}' missing, emitting plain code", HIGHLIGHT_THEME);
        return plain_code_block(language, code);
    };

    match highlighted_html_for_string(code, &SYNTAXES, syntax, theme) {
        Ok(html) => format!("<div class=\"codehilite\">{html}</div>\n"),
        Err(e) => {
            warn!(
                "Highlighting failed for language {:?}: {}, emitting plain code",
                language, e
            );
            plain_code_block(language, code)
        }
    }
}

fn find_syntax(token: &str) -> Option<&'static SyntaxReference> {
    let lowercase = token.to_ascii_lowercase();
    SYNTAXES
        .find_syntax_by_token(&lowercase)
        .or_else(|| SYNTAXES.find_syntax_by_name(token))
        .or_else(|| SYNTAXES.find_syntax_by_extension(&lowercase))
}

fn plain_code_block(language: Option<&str>, code: &str) -> String {
    let class = language
        .map(|l| format!(" class=\"language-{}\"", escape_html(l)))
        .unwrap_or_default();
    format!("<pre><code{class}>{}</code></pre>\n", escape_html(code))
}

// ── Table of contents ────────────────────────────────────────────────────

fn toc_html(headings: &[TocEntry]) -> String {
    let mut html = String::from("<div class=\"toc\">\n");
    let mut open: Vec<u8> = Vec::new();

    for entry in headings {
        if open.last().is_none_or(|&top| entry.level > top) {
            html.push_str("<ul>\n");
            open.push(entry.level);
        } else {
            while open.len() > 1 && open.last().is_some_and(|&top| entry.level < top) {
                html.push_str("</li>\n</ul>\n");
                open.pop();
            }
            html.push_str("</li>\n");
        }
        html.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            entry.slug,
            escape_html(&entry.text)
        ));
    }
    for _ in &open {
        html.push_str("</li>\n</ul>\n");
    }

    html.push_str("</div>\n");
    html
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
