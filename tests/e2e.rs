//! End-to-end integration tests for md2img.
//!
//! The first group exercises the public API without any external renderer.
//! The rendering group needs `weasyprint` on `PATH` and a PDFium library, and
//! is gated behind the `E2E_ENABLED` environment variable so it does not run
//! in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use md2img::pipeline::{document, postprocess};
use md2img::{
    convert, convert_file, md_to_images, Backend, ConversionConfig, ConversionProgressCallback,
    Md2ImgError, OutputTarget, PageSize, Style,
};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip unless E2E_ENABLED is set and both weasyprint and PDFium are usable.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let weasyprint = Command::new("weasyprint")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if !matches!(weasyprint, Ok(s) if s.success()) {
            println!("SKIP: weasyprint not found on PATH");
            return;
        }
        if let Err(e) = md2img_pdfium::bind_pdfium() {
            println!("SKIP: PDFium not available: {e}");
            return;
        }
    }};
}

fn long_markdown(sections: usize) -> String {
    let mut md = String::from("# Field notes\n\n[TOC]\n\n");
    for i in 1..=sections {
        md.push_str(&format!("## Section {i}\n\n"));
        for _ in 0..4 {
            md.push_str(
                "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
                 tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam.\n\n",
            );
        }
        md.push_str("```rust\nfn main() {\n    println!(\"hello\");\n}\n```\n\n");
    }
    md
}

fn dims(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).expect("image should be readable")
}

fn numbered(dir: &Path, stem: &str, n: usize) -> PathBuf {
    dir.join(format!("{stem}_{n}.png"))
}

// ── API behaviour (no renderer needed) ───────────────────────────────────────

#[test]
fn convert_file_with_missing_source_fails_before_writing() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out_dir = tmp.path().join("out");
    let err = convert_file(
        tmp.path().join("absent.md"),
        Some(&out_dir.join("card.png")),
        &ConversionConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, Md2ImgError::FileNotFound { .. }), "got: {err:?}");
    assert!(!out_dir.exists());
}

#[test]
fn unknown_backend_name_is_rejected() {
    let err = "pandoc".parse::<Backend>().unwrap_err();
    assert!(matches!(err, Md2ImgError::UnsupportedBackend { ref name } if name == "pandoc"));
    assert_eq!("imgkit".parse::<Backend>().unwrap(), Backend::Wkhtmltoimage);
    assert_eq!("primary".parse::<Backend>().unwrap(), Backend::WeasyPrint);
}

#[test]
fn unknown_style_renders_like_default() {
    let md = "# Title\n\nSome *text*.";
    let fallback = ConversionConfig::builder()
        .style(Style::from_name("no-such-theme"))
        .build()
        .unwrap();
    let default = ConversionConfig::default();

    assert_eq!(
        document::assemble(md, &fallback).unwrap(),
        document::assemble(md, &default).unwrap()
    );
}

#[test]
fn page_rule_follows_theme_and_extra_css() {
    let config = ConversionConfig::builder()
        .style(Style::Virgil)
        .extra_css("h1 { color: rebeccapurple; }")
        .page_size(PageSize::SQUARE_1_1)
        .build()
        .unwrap();
    let html = document::assemble("# Hi", &config).unwrap();

    let extra = html.find("rebeccapurple").unwrap();
    let page = html.find("size: 1080px 1080px").unwrap();
    assert!(extra < page, "custom @page rule must come last");
    assert!(html.contains("<h1"));
}

#[test]
fn zero_page_size_is_invalid() {
    assert!(matches!(
        "0x1656".parse::<PageSize>(),
        Err(Md2ImgError::InvalidPageSize { .. })
    ));
    assert_eq!("1080x1080".parse::<PageSize>().unwrap(), PageSize::SQUARE_1_1);
}

// ── Rendering (weasyprint + PDFium) ──────────────────────────────────────────

#[test]
fn paged_images_match_page_size() {
    e2e_skip_unless_ready!();
    let tmp = tempfile::TempDir::new().unwrap();
    let size = PageSize::new(600, 400).unwrap();
    let config = ConversionConfig::builder().page_size(size).build().unwrap();

    let output = convert(&long_markdown(6), tmp.path().join("card.png"), &config).unwrap();

    assert!(output.images.len() > 1, "long input should span several pages");
    assert_eq!(output.images.len(), output.stats.page_count);
    for (i, path) in output.images.iter().enumerate() {
        assert_eq!(path, &numbered(tmp.path(), "card", i + 1));
        assert_eq!(dims(path), (600, 400), "{}", path.display());
    }
    assert!(!tmp.path().join("card.png").exists());
    println!("✓ {} pages", output.images.len());
}

#[test]
fn shorter_pages_never_reduce_page_count() {
    e2e_skip_unless_ready!();
    let tmp = tempfile::TempDir::new().unwrap();
    let md = long_markdown(4);

    let tall = ConversionConfig::builder()
        .page_size(PageSize::new(600, 900).unwrap())
        .build()
        .unwrap();
    let short = ConversionConfig::builder()
        .page_size(PageSize::new(600, 450).unwrap())
        .build()
        .unwrap();

    let tall_count = convert(&md, tmp.path().join("tall/card.png"), &tall)
        .unwrap()
        .images
        .len();
    let short_count = convert(&md, tmp.path().join("short/card.png"), &short)
        .unwrap()
        .images
        .len();
    assert!(short_count >= tall_count, "{short_count} < {tall_count}");
}

#[test]
fn unpaged_image_is_cropped_to_content() {
    e2e_skip_unless_ready!();
    let tmp = tempfile::TempDir::new().unwrap();
    let out = tmp.path().join("nested/dir/long.png");

    let output = convert(&long_markdown(3), &out, &ConversionConfig::default()).unwrap();

    assert_eq!(output.single(), Some(out.as_path()));
    let img = image::open(&out).unwrap();
    // A second crop pass finds nothing to remove.
    let bounds = postprocess::crop_box(&img).expect("image has content");
    assert_eq!(
        (bounds.left, bounds.top, bounds.right, bounds.bottom),
        (0, 0, img.width(), img.height())
    );
}

#[test]
fn jpeg_extension_writes_jpeg() {
    e2e_skip_unless_ready!();
    let tmp = tempfile::TempDir::new().unwrap();
    let out = tmp.path().join("card.jpg");
    convert("# JPEG\n\nbody", &out, &ConversionConfig::default()).unwrap();

    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
}

#[test]
fn md_to_images_defaults_to_portrait_cards() {
    e2e_skip_unless_ready!();
    let tmp = tempfile::TempDir::new().unwrap();
    let target = OutputTarget::Directory {
        dir: tmp.path().join("cards"),
        basename: "post".into(),
    };

    let paths = md_to_images(&long_markdown(2), &target, &ConversionConfig::default()).unwrap();

    assert!(!paths.is_empty());
    for (i, path) in paths.iter().enumerate() {
        assert!(path.is_absolute());
        assert!(path.ends_with(format!("cards/post_{}.png", i + 1)));
        assert_eq!(dims(path), (1242, 1656));
    }
}

#[test]
fn rendering_is_deterministic() {
    e2e_skip_unless_ready!();
    let tmp = tempfile::TempDir::new().unwrap();
    let md = long_markdown(1);
    let config = ConversionConfig::builder()
        .style(Style::Excali)
        .build()
        .unwrap();

    let a = convert(&md, tmp.path().join("a.png"), &config).unwrap();
    let b = convert(&md, tmp.path().join("b.png"), &config).unwrap();

    let a = image::open(&a.images[0]).unwrap().to_rgba8();
    let b = image::open(&b.images[0]).unwrap().to_rgba8();
    assert_eq!(a.dimensions(), b.dimensions());
    assert!(a.as_raw() == b.as_raw(), "two renders of the same input differ");
}

#[test]
fn progress_reports_every_page() {
    e2e_skip_unless_ready!();

    #[derive(Default)]
    struct Counter {
        pages: AtomicUsize,
        written: AtomicUsize,
    }
    impl ConversionProgressCallback for Counter {
        fn on_page_complete(&self, _page: usize, _total: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }
        fn on_image_written(&self, _path: &Path) {
            self.written.fetch_add(1, Ordering::SeqCst);
        }
    }

    let tmp = tempfile::TempDir::new().unwrap();
    let counter = Arc::new(Counter::default());
    let config = ConversionConfig::builder()
        .page_size(PageSize::new(600, 400).unwrap())
        .progress_callback(counter.clone())
        .build()
        .unwrap();

    let output = convert(&long_markdown(3), tmp.path().join("p.png"), &config).unwrap();
    assert_eq!(counter.pages.load(Ordering::SeqCst), output.stats.page_count);
    assert_eq!(counter.written.load(Ordering::SeqCst), output.images.len());
}
