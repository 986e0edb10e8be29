//! Configuration types for Markdown-to-image conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Every knob has a documented default,
//! so the common call is `ConversionConfig::default()` plus one or two
//! setters.

use crate::error::Md2ImgError;
use crate::progress::ProgressCallback;
use crate::style::Style;
use encoding_rs::{Encoding, GBK, REPLACEMENT, UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Rasterisation DPI for fixed-size pages.
///
/// The layout engine's CSS pixel is 1/96 inch, so rendering at 96 DPI makes
/// one CSS pixel exactly one output pixel.
pub const PAGED_DPI: u32 = 96;

/// Default rasterisation DPI when no page size is requested.
pub const DEFAULT_UNPAGED_DPI: u32 = 150;

/// Quality used for every JPEG the library writes.
pub const JPEG_QUALITY: u8 = 95;

/// Margin of the injected `@page` rule, in CSS pixels.
pub const PAGE_MARGIN_PX: u32 = 28;

/// Configuration for a Markdown-to-image conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use md2img::{ConversionConfig, PageSize, Style};
///
/// let config = ConversionConfig::builder()
///     .page_size(PageSize::PORTRAIT_3_4)
///     .style(Style::Virgil)
///     .extra_css("body { background: #fffdf5; }")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Which renderer turns HTML into pixels. Default: [`Backend::WeasyPrint`].
    pub backend: Backend,

    /// Fixed page size in CSS pixels. Default: `None` (one long cropped image).
    ///
    /// When set, long documents are split into several images of exactly this
    /// size, named `{stem}_1.{ext}`, `{stem}_2.{ext}`, ….
    pub page_size: Option<PageSize>,

    /// Extra CSS appended after the style's stylesheet, so it wins on equal
    /// specificity.
    pub extra_css: Option<String>,

    /// Markdown extensions to enable. Default: [`DEFAULT_EXTENSIONS`].
    pub extensions: Vec<MarkdownExtension>,

    /// Visual theme. Default: [`Style::Default`].
    pub style: Style,

    /// Encoding used by [`crate::convert_file`] to read the source. Default: UTF-8.
    pub encoding: TextEncoding,

    /// Rasterisation DPI for unpaged output. Range: 72–400. Default: 150.
    ///
    /// Unpaged images have no pixel-size contract, so they are rendered
    /// sharper than the 96 DPI used for fixed pages.
    pub unpaged_dpi: u32,

    /// `<title>` of the assembled HTML document. Default: "Markdown Export".
    pub title: String,

    /// `lang` attribute of the assembled HTML document. Default: "zh-CN".
    ///
    /// The layout engine picks CJK line-breaking and font fallback from it.
    pub lang: String,

    /// Path or name of the `weasyprint` executable. Default: "weasyprint".
    pub weasyprint_path: PathBuf,

    /// Path or name of the `wkhtmltoimage` executable. Default: "wkhtmltoimage".
    pub wkhtmltoimage_path: PathBuf,

    /// Directory that relative URLs (images, stylesheets) resolve against.
    ///
    /// [`crate::convert_file`] fills this with the source file's directory
    /// when it is unset.
    pub base_url: Option<PathBuf>,

    /// Optional per-page progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            page_size: None,
            extra_css: None,
            extensions: DEFAULT_EXTENSIONS.to_vec(),
            style: Style::default(),
            encoding: TextEncoding::default(),
            unpaged_dpi: DEFAULT_UNPAGED_DPI,
            title: "Markdown Export".to_string(),
            lang: "zh-CN".to_string(),
            weasyprint_path: PathBuf::from("weasyprint"),
            wkhtmltoimage_path: PathBuf::from("wkhtmltoimage"),
            base_url: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("backend", &self.backend)
            .field("page_size", &self.page_size)
            .field("extra_css", &self.extra_css.as_ref().map(|c| c.len()))
            .field("extensions", &self.extensions)
            .field("style", &self.style)
            .field("encoding", &self.encoding)
            .field("unpaged_dpi", &self.unpaged_dpi)
            .field("title", &self.title)
            .field("lang", &self.lang)
            .field("weasyprint_path", &self.weasyprint_path)
            .field("wkhtmltoimage_path", &self.wkhtmltoimage_path)
            .field("base_url", &self.base_url)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = Some(size);
        self
    }

    /// Clear any fixed page size: render one long, cropped image.
    pub fn unpaged(mut self) -> Self {
        self.config.page_size = None;
        self
    }

    pub fn extra_css(mut self, css: impl Into<String>) -> Self {
        self.config.extra_css = Some(css.into());
        self
    }

    pub fn extensions(mut self, extensions: Vec<MarkdownExtension>) -> Self {
        self.config.extensions = extensions;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.config.style = style;
        self
    }

    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    pub fn unpaged_dpi(mut self, dpi: u32) -> Self {
        self.config.unpaged_dpi = dpi.clamp(72, 400);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.config.lang = lang.into();
        self
    }

    pub fn weasyprint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.weasyprint_path = path.into();
        self
    }

    pub fn wkhtmltoimage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.wkhtmltoimage_path = path.into();
        self
    }

    pub fn base_url(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_url = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2ImgError> {
        let c = &self.config;
        if c.unpaged_dpi < 72 || c.unpaged_dpi > 400 {
            return Err(Md2ImgError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.unpaged_dpi
            )));
        }
        if c.title.trim().is_empty() {
            return Err(Md2ImgError::InvalidConfig(
                "Document title must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Page size ────────────────────────────────────────────────────────────

/// A fixed page size in CSS pixels. Both sides are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPageSize")]
pub struct PageSize {
    width: u32,
    height: u32,
}

impl PageSize {
    /// 3:4 portrait, 1242×1656. Fills a phone screen; default for [`crate::md_to_images`].
    pub const PORTRAIT_3_4: PageSize = PageSize {
        width: 1242,
        height: 1656,
    };
    /// 1:1 square, 1080×1080.
    pub const SQUARE_1_1: PageSize = PageSize {
        width: 1080,
        height: 1080,
    };
    /// 2:3 tall portrait, 1080×1620.
    pub const PORTRAIT_2_3: PageSize = PageSize {
        width: 1080,
        height: 1620,
    };
    /// 4:3 landscape, 1440×1080.
    pub const LANDSCAPE_4_3: PageSize = PageSize {
        width: 1440,
        height: 1080,
    };

    /// Every preset with its ratio label.
    pub const PRESETS: [(&'static str, PageSize); 4] = [
        ("3:4", Self::PORTRAIT_3_4),
        ("1:1", Self::SQUARE_1_1),
        ("2:3", Self::PORTRAIT_2_3),
        ("4:3", Self::LANDSCAPE_4_3),
    ];

    pub fn new(width: u32, height: u32) -> Result<Self, Md2ImgError> {
        if width == 0 || height == 0 {
            return Err(Md2ImgError::InvalidPageSize { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The `@page` rule that forces this size.
    pub fn css_rule(&self) -> String {
        format!(
            "@page {{ size: {}px {}px; margin: {}px; }}",
            self.width, self.height, PAGE_MARGIN_PX
        )
    }
}

#[derive(Deserialize)]
struct RawPageSize {
    width: u32,
    height: u32,
}

impl TryFrom<RawPageSize> for PageSize {
    type Error = Md2ImgError;

    fn try_from(raw: RawPageSize) -> Result<Self, Self::Error> {
        PageSize::new(raw.width, raw.height)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for PageSize {
    type Err = Md2ImgError;

    /// Parse `1242x1656` (also `X` or `×`) or a preset label such as `3:4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((_, size)) = Self::PRESETS.iter().find(|(label, _)| *label == s) {
            return Ok(*size);
        }

        let (w, h) = s
            .split_once(['x', 'X', '×'])
            .ok_or_else(|| {
                Md2ImgError::InvalidConfig(format!(
                    "Invalid page size '{s}': expected WIDTHxHEIGHT or one of 3:4, 1:1, 2:3, 4:3"
                ))
            })?;
        let parse = |v: &str| {
            v.trim().parse::<u32>().map_err(|_| {
                Md2ImgError::InvalidConfig(format!("Invalid page dimension '{}' in '{s}'", v.trim()))
            })
        };
        PageSize::new(parse(w)?, parse(h)?)
    }
}

// ── Backend ──────────────────────────────────────────────────────────────

/// Rendering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// WeasyPrint lays the document out as PDF pages; pdfium rasterises them.
    /// Supports fixed page sizes and multi-page output. (default)
    #[default]
    WeasyPrint,
    /// `wkhtmltoimage` renders the HTML straight to one image.
    Wkhtmltoimage,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Backend::WeasyPrint => "weasyprint",
            Backend::Wkhtmltoimage => "wkhtmltoimage",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = Md2ImgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weasyprint" | "primary" => Ok(Backend::WeasyPrint),
            "wkhtmltoimage" | "imgkit" | "alternative" => Ok(Backend::Wkhtmltoimage),
            _ => Err(Md2ImgError::UnsupportedBackend {
                name: s.to_string(),
            }),
        }
    }
}

// ── Markdown extensions ──────────────────────────────────────────────────

/// Markdown syntax extensions layered on top of CommonMark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownExtension {
    /// Tables, footnotes, definition lists and strikethrough.
    Extra,
    /// Syntax-highlight fenced code blocks.
    CodeHilite,
    /// Heading anchors and `[TOC]` expansion.
    Toc,
    /// GFM tables only.
    Tables,
    /// Footnotes only.
    Footnotes,
    /// `~~strikethrough~~` only.
    Strikethrough,
    /// `- [x]` task lists.
    Tasklist,
    /// Bare URLs become links.
    Autolink,
}

/// Extensions enabled when the caller does not choose.
pub const DEFAULT_EXTENSIONS: [MarkdownExtension; 3] = [
    MarkdownExtension::Extra,
    MarkdownExtension::CodeHilite,
    MarkdownExtension::Toc,
];

impl MarkdownExtension {
    pub fn name(self) -> &'static str {
        match self {
            MarkdownExtension::Extra => "extra",
            MarkdownExtension::CodeHilite => "codehilite",
            MarkdownExtension::Toc => "toc",
            MarkdownExtension::Tables => "tables",
            MarkdownExtension::Footnotes => "footnotes",
            MarkdownExtension::Strikethrough => "strikethrough",
            MarkdownExtension::Tasklist => "tasklist",
            MarkdownExtension::Autolink => "autolink",
        }
    }

    /// Parse a comma-separated list such as `extra,toc`. An empty string
    /// yields an empty list (plain CommonMark).
    pub fn parse_list(s: &str) -> Result<Vec<MarkdownExtension>, Md2ImgError> {
        let mut list = Vec::new();
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let ext = name.parse()?;
            if !list.contains(&ext) {
                list.push(ext);
            }
        }
        Ok(list)
    }
}

impl fmt::Display for MarkdownExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MarkdownExtension {
    type Err = Md2ImgError;

    /// Names are case-insensitive; a `markdown.extensions.` prefix is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower
            .strip_prefix("markdown.extensions.")
            .unwrap_or(&lower);
        match name {
            "extra" => Ok(MarkdownExtension::Extra),
            "codehilite" => Ok(MarkdownExtension::CodeHilite),
            "toc" => Ok(MarkdownExtension::Toc),
            "tables" => Ok(MarkdownExtension::Tables),
            "footnotes" => Ok(MarkdownExtension::Footnotes),
            "strikethrough" => Ok(MarkdownExtension::Strikethrough),
            "tasklist" => Ok(MarkdownExtension::Tasklist),
            "autolink" => Ok(MarkdownExtension::Autolink),
            _ => Err(Md2ImgError::InvalidConfig(format!(
                "Unknown Markdown extension '{}'",
                s.trim()
            ))),
        }
    }
}

// ── Text encoding ────────────────────────────────────────────────────────

/// Encoding of a Markdown source file.
///
/// Any WHATWG label is accepted (`utf-8`, `gbk`, `gb18030`, `big5`,
/// `shift_jis`, `latin1`, …) plus `utf-8-sig`, which drops a leading BOM.
/// Decoding is strict: malformed input is an error, never replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding {
    encoding: &'static Encoding,
    strip_bom: bool,
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::utf8()
    }
}

impl TextEncoding {
    /// Strict UTF-8. A leading BOM is kept as U+FEFF. (default)
    pub fn utf8() -> TextEncoding {
        TextEncoding {
            encoding: UTF_8,
            strip_bom: false,
        }
    }

    /// UTF-8 with an optional leading BOM, which is dropped.
    pub fn utf8_sig() -> TextEncoding {
        TextEncoding {
            encoding: UTF_8,
            strip_bom: true,
        }
    }

    /// `latin-1` / `iso-8859-1`, decoded as windows-1252 like browsers do.
    pub fn latin1() -> TextEncoding {
        TextEncoding {
            encoding: WINDOWS_1252,
            strip_bom: false,
        }
    }

    /// GBK, the common encoding of Simplified Chinese text files.
    pub fn gbk() -> TextEncoding {
        TextEncoding {
            encoding: GBK,
            strip_bom: false,
        }
    }

    /// Look up an encoding by label; `None` for unknown labels.
    pub fn for_label(label: &str) -> Option<TextEncoding> {
        let raw = label.trim().to_ascii_lowercase();
        let dashed = raw.replace('_', "-");
        if matches!(dashed.as_str(), "utf-8-sig" | "utf8-sig") {
            return Some(TextEncoding::utf8_sig());
        }
        // Python spellings such as `utf_8` and `latin-1` are not WHATWG labels.
        let encoding = Encoding::for_label(raw.as_bytes())
            .or_else(|| Encoding::for_label(dashed.as_bytes()))
            .or_else(|| Encoding::for_label(dashed.replace('-', "").as_bytes()))?;
        if encoding == REPLACEMENT {
            return None;
        }
        Some(TextEncoding {
            encoding,
            strip_bom: false,
        })
    }

    pub fn name(self) -> &'static str {
        if self.strip_bom {
            "utf-8-sig"
        } else {
            self.encoding.name()
        }
    }

    /// Decode `bytes`; the error string says why the input was rejected.
    pub fn decode(self, bytes: Vec<u8>) -> Result<String, String> {
        let body = if self.strip_bom {
            bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes)
        } else {
            &bytes[..]
        };
        let (text, had_errors) = self.encoding.decode_without_bom_handling(body);
        if had_errors {
            return Err(format!("malformed byte sequence for {}", self.encoding.name()));
        }
        Ok(text.into_owned())
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = Md2ImgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextEncoding::for_label(s).ok_or_else(|| {
            Md2ImgError::InvalidConfig(format!(
                "Unsupported encoding '{}': use a label such as utf-8, utf-8-sig, gbk or latin-1",
                s.trim()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.backend, Backend::WeasyPrint);
        assert!(c.page_size.is_none());
        assert_eq!(c.extensions, DEFAULT_EXTENSIONS.to_vec());
        assert_eq!(c.style, Style::Default);
        assert_eq!(c.unpaged_dpi, 150);
        assert_eq!(c.title, "Markdown Export");
    }

    #[test]
    fn builder_clamps_dpi() {
        let c = ConversionConfig::builder().unpaged_dpi(10).build().unwrap();
        assert_eq!(c.unpaged_dpi, 72);
        let c = ConversionConfig::builder().unpaged_dpi(9000).build().unwrap();
        assert_eq!(c.unpaged_dpi, 400);
    }

    #[test]
    fn builder_rejects_blank_title() {
        let err = ConversionConfig::builder().title("  ").build().unwrap_err();
        assert!(matches!(err, Md2ImgError::InvalidConfig(_)));
    }

    #[test]
    fn unpaged_clears_page_size() {
        let c = ConversionConfig::builder()
            .page_size(PageSize::SQUARE_1_1)
            .unpaged()
            .build()
            .unwrap();
        assert!(c.page_size.is_none());
    }

    #[test]
    fn page_size_rejects_zero() {
        assert!(matches!(
            PageSize::new(0, 10),
            Err(Md2ImgError::InvalidPageSize { width: 0, height: 10 })
        ));
        assert!(PageSize::new(10, 0).is_err());
        assert_eq!(PageSize::new(10, 20).unwrap().height(), 20);
    }

    #[test]
    fn page_size_parsing() {
        assert_eq!("1080x1080".parse::<PageSize>().unwrap(), PageSize::SQUARE_1_1);
        assert_eq!(" 1440 X 1080 ".parse::<PageSize>().unwrap(), PageSize::LANDSCAPE_4_3);
        assert_eq!("1080×1620".parse::<PageSize>().unwrap(), PageSize::PORTRAIT_2_3);
        assert_eq!("3:4".parse::<PageSize>().unwrap(), PageSize::PORTRAIT_3_4);
        assert!("1080".parse::<PageSize>().is_err());
        assert!("ax100".parse::<PageSize>().is_err());
        assert!(matches!(
            "0x100".parse::<PageSize>(),
            Err(Md2ImgError::InvalidPageSize { .. })
        ));
    }

    #[test]
    fn page_size_deserialisation_validates() {
        let ok: PageSize = serde_json::from_str(r#"{"width":1080,"height":1620}"#).unwrap();
        assert_eq!(ok, PageSize::PORTRAIT_2_3);
        assert!(serde_json::from_str::<PageSize>(r#"{"width":0,"height":1}"#).is_err());
    }

    #[test]
    fn page_rule_uses_fixed_margin() {
        assert_eq!(
            PageSize::PORTRAIT_3_4.css_rule(),
            "@page { size: 1242px 1656px; margin: 28px; }"
        );
    }

    #[test]
    fn backend_parsing() {
        assert_eq!("primary".parse::<Backend>().unwrap(), Backend::WeasyPrint);
        assert_eq!("WeasyPrint".parse::<Backend>().unwrap(), Backend::WeasyPrint);
        assert_eq!("alternative".parse::<Backend>().unwrap(), Backend::Wkhtmltoimage);
        assert_eq!("imgkit".parse::<Backend>().unwrap(), Backend::Wkhtmltoimage);
        let err = "chromium".parse::<Backend>().unwrap_err();
        assert!(matches!(err, Md2ImgError::UnsupportedBackend { ref name } if name == "chromium"));
    }

    #[test]
    fn extension_list_parsing() {
        assert_eq!(
            MarkdownExtension::parse_list("extra, markdown.extensions.toc,extra").unwrap(),
            vec![MarkdownExtension::Extra, MarkdownExtension::Toc]
        );
        assert!(MarkdownExtension::parse_list("").unwrap().is_empty());
        assert!(MarkdownExtension::parse_list("extra,smarty").is_err());
    }

    #[test]
    fn encoding_decode() {
        assert_eq!(TextEncoding::utf8().decode("héllo".into()).unwrap(), "héllo");
        assert!(TextEncoding::utf8().decode(vec![0xff, 0xfe]).is_err());
        assert_eq!(
            TextEncoding::utf8_sig().decode(b"\xEF\xBB\xBF# hi".to_vec()).unwrap(),
            "# hi"
        );
        assert_eq!(
            TextEncoding::utf8().decode(b"\xEF\xBB\xBF# hi".to_vec()).unwrap(),
            "\u{feff}# hi"
        );
        assert_eq!(TextEncoding::latin1().decode(vec![0x63, 0x61, 0x66, 0xe9]).unwrap(), "café");
        // "中文" in GBK.
        assert_eq!(TextEncoding::gbk().decode(vec![0xD6, 0xD0, 0xCE, 0xC4]).unwrap(), "中文");
        assert!(TextEncoding::gbk().decode(vec![0xD6]).is_err());
    }

    #[test]
    fn encoding_parsing() {
        assert_eq!("UTF8".parse::<TextEncoding>().unwrap(), TextEncoding::utf8());
        assert_eq!("utf_8_sig".parse::<TextEncoding>().unwrap(), TextEncoding::utf8_sig());
        assert_eq!("ISO-8859-1".parse::<TextEncoding>().unwrap(), TextEncoding::latin1());
        assert_eq!("latin-1".parse::<TextEncoding>().unwrap(), TextEncoding::latin1());
        assert_eq!("gbk".parse::<TextEncoding>().unwrap(), TextEncoding::gbk());
        assert_eq!("GB18030".parse::<TextEncoding>().unwrap().name(), "gb18030");
        assert!("replacement".parse::<TextEncoding>().is_err());
        assert!("klingon".parse::<TextEncoding>().is_err());
    }
}
