//! Bundled CSS templates, keyed by [`Style`].
//!
//! Each template is a static stylesheet compiled into the binary with
//! `include_str!`. Every one of them sets a base `@page` size and styles body
//! typography, headings, code, tables, quotes and rules, so switching styles
//! never leaves an element unstyled.
//!
//! Lookup by name never fails: an unknown name renders with
//! [`Style::Default`]. Callers passing user input straight through (CLI flags,
//! config files) get a picture either way.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

const DEFAULT_CSS: &str = include_str!("styles/default.css");
const HANDWRITING_CSS: &str = include_str!("styles/handwriting.css");
const MUYAO_CSS: &str = include_str!("styles/muyao.css");
const VIRGIL_CSS: &str = include_str!("styles/virgil.css");
const PARCHMENT_CSS: &str = include_str!("styles/parchment.css");
const EXCALI_CSS: &str = include_str!("styles/excali.css");

/// A named visual theme for the rendered card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Modern sans-serif, GitHub-like. (default)
    #[default]
    Default,
    /// Kaiti / chancery handwriting.
    Handwriting,
    /// Muyao soft-brush handwriting with warm accents.
    Muyao,
    /// Virgil hand-drawn font with violet accents.
    Virgil,
    /// Aged-paper gradient background.
    Parchment,
    /// Same stylesheet as [`Style::Parchment`], kept as a separate name.
    Obsidian,
    /// Excalifont sketch style with a double border.
    Excali,
}

impl Style {
    /// Every style, in the order the CLI lists them.
    pub const ALL: [Style; 7] = [
        Style::Default,
        Style::Handwriting,
        Style::Muyao,
        Style::Virgil,
        Style::Parchment,
        Style::Obsidian,
        Style::Excali,
    ];

    /// Resolve a style by name, case-insensitively.
    ///
    /// Unrecognised names fall back to [`Style::Default`].
    pub fn from_name(name: &str) -> Style {
        match Self::lookup(name) {
            Some(style) => style,
            None => {
                warn!("Unknown style '{}', using default", name);
                Style::Default
            }
        }
    }

    fn lookup(name: &str) -> Option<Style> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// The identifier accepted by [`Style::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            Style::Default => "default",
            Style::Handwriting => "handwriting",
            Style::Muyao => "muyao",
            Style::Virgil => "virgil",
            Style::Parchment => "parchment",
            Style::Obsidian => "obsidian",
            Style::Excali => "excali",
        }
    }

    /// The base stylesheet for this style.
    pub fn css(self) -> &'static str {
        match self {
            Style::Default => DEFAULT_CSS,
            Style::Handwriting => HANDWRITING_CSS,
            Style::Muyao => MUYAO_CSS,
            Style::Virgil => VIRGIL_CSS,
            Style::Parchment | Style::Obsidian => PARCHMENT_CSS,
            Style::Excali => EXCALI_CSS,
        }
    }

    /// One-line description for `--list-styles`.
    pub fn description(self) -> &'static str {
        match self {
            Style::Default => "modern sans-serif, GitHub-like",
            Style::Handwriting => "Kaiti handwriting",
            Style::Muyao => "Muyao soft-brush handwriting",
            Style::Virgil => "Virgil hand-drawn font",
            Style::Parchment => "aged parchment background",
            Style::Obsidian => "alias of parchment",
            Style::Excali => "Excalifont sketch with double border",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Style::from_name(s))
    }
}
