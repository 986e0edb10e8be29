//! HTML document assembly.
//!
//! The document shell inlines every stylesheet so the layout engine needs
//! nothing but the string itself. Rules land in this order inside the single
//! `<style>` block:
//!
//! ```text
//! base style CSS  →  extra CSS  →  @page size override
//! ```
//!
//! Later rules win on equal specificity, so caller CSS beats the template and
//! the page size beats both.

use crate::config::{ConversionConfig, PageSize};
use crate::error::Md2ImgError;
use crate::pipeline::markdown;
use crate::style::Style;
use tracing::debug;

/// Everything the shell needs besides the body fragment.
#[derive(Debug, Clone, Copy)]
pub struct DocumentParts<'a> {
    pub style: Style,
    pub extra_css: Option<&'a str>,
    pub page_size: Option<PageSize>,
    pub title: &'a str,
    pub lang: &'a str,
}

impl<'a> DocumentParts<'a> {
    pub fn from_config(config: &'a ConversionConfig) -> Self {
        Self {
            style: config.style,
            extra_css: config.extra_css.as_deref(),
            page_size: config.page_size,
            title: &config.title,
            lang: &config.lang,
        }
    }
}

/// Render Markdown and wrap it into a complete HTML document.
pub fn assemble(markdown: &str, config: &ConversionConfig) -> Result<String, Md2ImgError> {
    let body = markdown::markdown_to_html(markdown, &config.extensions)?;
    let html = wrap_fragment(&body, &DocumentParts::from_config(config));
    debug!(
        "Assembled HTML document: {} bytes (style={}, page_size={:?})",
        html.len(),
        config.style,
        config.page_size
    );
    Ok(html)
}

/// Wrap an HTML body fragment into a document shell.
pub fn wrap_fragment(body: &str, parts: &DocumentParts<'_>) -> String {
    format!(
        "<!DOCTYPE html>\n\
<html lang=\"{lang}\">\n\
<head>\n\
  <meta charset=\"UTF-8\">\n\
  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
  <title>{title}</title>\n\
  <style>{css}</style>\n\
</head>\n\
<body>\n\
{body}\n\
</body>\n\
</html>",
        lang = escape_attr(parts.lang),
        title = escape_attr(parts.title),
        css = style_block(parts),
    )
}

/// Contents of the single `<style>` element, in cascade order.
fn style_block(parts: &DocumentParts<'_>) -> String {
    let mut css = parts.style.css().to_string();
    if let Some(extra) = parts.extra_css.filter(|c| !c.trim().is_empty()) {
        css.push('\n');
        css.push_str(&neutralise_close_tags(extra));
        css.push('\n');
    }
    if let Some(size) = parts.page_size {
        css.push('\n');
        css.push_str(&size.css_rule());
        css.push('\n');
    }
    css
}

/// `</` inside caller CSS would end the `<style>` element early.
fn neutralise_close_tags(css: &str) -> String {
    css.replace("</", "<\\/")
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
