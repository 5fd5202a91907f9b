//! End-to-end runs over small fonts written to scratch directories.

use glyphsplit::glyph::render_svg;
use glyphsplit::{run, Error, ExportConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Fresh directory holding `font.svg` and an empty `out/`
fn workspace(font: &str) -> (PathBuf, ExportConfig) {
    let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    let root = std::env::temp_dir().join(format!("glyphsplit-e2e-{}-{n}", std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(root.join("out")).unwrap();
    fs::write(root.join("font.svg"), font).unwrap();
    let config = ExportConfig {
        input: root.join("font.svg"),
        out_dir: root.join("out"),
    };
    (root, config)
}

fn svg_font(glyphs: &str) -> String {
    format!(
        r#"<?xml version="1.0" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg">
<metadata>Tiles</metadata>
<defs>
<font id="GL-MahjongTile" horiz-adv-x="640">
  <font-face font-family="GL-MahjongTile" units-per-em="1000" ascent="800" descent="-200"/>
  <missing-glyph horiz-adv-x="500"/>
{glyphs}
</font>
</defs>
</svg>
"#
    )
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_mapped_glyph_writes_exact_document() {
    let (_root, config) = workspace(&svg_font(r#"<glyph unicode="y" d="M0 0 L10 10 Z"/>"#));
    let summary = run(&config).unwrap();
    assert_eq!(summary.written, 1);
    assert_eq!(listing(&config.out_dir), vec!["c-5.svg"]);
    assert_eq!(
        fs::read_to_string(config.out_dir.join("c-5.svg")).unwrap(),
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="30 -115 580 830"><g><path d="M0 0 L10 10 Z" /></g></svg>"#
    );
}

#[test]
fn test_home_row_maps_to_group_b() {
    let (_root, config) = workspace(&svg_font(
        r#"<glyph unicode="a" d="M1"/><glyph unicode="l" d="M2"/><glyph unicode="." d="M3"/>"#,
    ));
    run(&config).unwrap();
    assert_eq!(listing(&config.out_dir), vec!["b-0.svg", "b-8.svg", "d-8.svg"]);
    assert_eq!(fs::read_to_string(config.out_dir.join("b-0.svg")).unwrap(), render_svg("M1"));
}

#[test]
fn test_unmapped_glyph_writes_nothing() {
    let (_root, config) = workspace(&svg_font(r#"<glyph unicode="!" d="M1"/><glyph unicode="ab" d="M2"/>"#));
    let summary = run(&config).unwrap();
    assert_eq!(summary.unmapped, 2);
    assert!(listing(&config.out_dir).is_empty());
}

#[test]
fn test_glyph_without_unicode_is_skipped() {
    let (_root, config) = workspace(&svg_font(r#"<glyph d="M1"/><glyph unicode="q" d="M2"/>"#));
    let summary = run(&config).unwrap();
    assert_eq!(summary.missing_unicode, 1);
    assert_eq!(listing(&config.out_dir), vec!["c-0.svg"]);
}

#[test]
fn test_missing_path_data_stops_without_creating_file() {
    let (_root, config) = workspace(&svg_font(
        r#"<glyph unicode="s" d="M1"/><glyph unicode="d"/><glyph unicode="f" d="M3"/>"#,
    ));
    let err = run(&config).unwrap_err();
    assert!(matches!(err, Error::MissingPathData { ref unicode } if unicode == "d"));
    assert_eq!(listing(&config.out_dir), vec!["b-1.svg"]);
}

#[test]
fn test_rerun_is_byte_identical() {
    let (_root, config) = workspace(&svg_font(r#"<glyph unicode="k" d="M5 5 &#x48; 3"/>"#));
    run(&config).unwrap();
    let first = fs::read(config.out_dir.join("b-7.svg")).unwrap();
    run(&config).unwrap();
    let second = fs::read(config.out_dir.join("b-7.svg")).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, render_svg("M5 5 H 3").into_bytes());
}

#[test]
fn test_duplicate_unicode_last_glyph_wins() {
    let (_root, config) = workspace(&svg_font(r#"<glyph unicode="x" d="M1"/><glyph unicode="x" d="M2"/>"#));
    let summary = run(&config).unwrap();
    assert_eq!(summary.written, 2);
    assert_eq!(listing(&config.out_dir), vec!["d-1.svg"]);
    assert_eq!(fs::read_to_string(config.out_dir.join("d-1.svg")).unwrap(), render_svg("M2"));
}

#[test]
fn test_glyphs_across_several_fonts() {
    let font = r#"<svg xmlns="http://www.w3.org/2000/svg">
<defs><font><glyph unicode="z" d="M1"/></font></defs>
<defs><font><glyph unicode="m" d="M2"/></font><font><glyph unicode="n" d="M3"/></font></defs>
</svg>"#;
    let (_root, config) = workspace(font);
    let summary = run(&config).unwrap();
    assert_eq!(summary.matched, 3);
    assert_eq!(listing(&config.out_dir), vec!["d-0.svg", "d-5.svg", "d-6.svg"]);
}

#[test]
fn test_prefixed_namespace_matches() {
    let font = r#"<s:svg xmlns:s="urn:tiles"><s:defs><s:font><s:glyph unicode="e" d="M1"/></s:font></s:defs></s:svg>"#;
    let (_root, config) = workspace(font);
    run(&config).unwrap();
    assert_eq!(listing(&config.out_dir), vec!["c-2.svg"]);
}

#[test]
fn test_unnamespaced_document_yields_nothing() {
    let font = r#"<svg><defs><font><glyph unicode="a" d="M1"/></font></defs></svg>"#;
    let (_root, config) = workspace(font);
    let summary = run(&config).unwrap();
    assert_eq!(summary.matched, 0);
    assert!(listing(&config.out_dir).is_empty());
}

#[test]
fn test_entities_from_internal_subset() {
    let font = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd" [
	<!ENTITY ns_svg "http://www.w3.org/2000/svg">
	<!ENTITY ns_xlink "http://www.w3.org/1999/xlink">
]>
<svg xmlns="&ns_svg;" xmlns:xlink="&ns_xlink;"><defs><font><glyph unicode="a" d="M0 0"/></font></defs></svg>"#;
    let (_root, config) = workspace(font);
    let summary = run(&config).unwrap();
    assert_eq!(summary.written, 1);
    assert_eq!(fs::read_to_string(config.out_dir.join("b-0.svg")).unwrap(), render_svg("M0 0"));
}

#[test]
fn test_undeclared_entity_is_parse_error() {
    let font = r#"<!DOCTYPE svg [<!ENTITY ns_svg "http://www.w3.org/2000/svg">]>
<svg xmlns="&ns_svgz;"><defs><font><glyph unicode="a" d="M0 0"/></font></defs></svg>"#;
    let (_root, config) = workspace(font);
    assert!(matches!(run(&config), Err(Error::Parse { .. })));
    assert!(listing(&config.out_dir).is_empty());
}

#[test]
fn test_latin1_font() {
    let (root, config) = workspace("");
    let mut font = br#"<?xml version="1.0" encoding="ISO-8859-1"?>
<svg xmlns="http://www.w3.org/2000/svg"><defs><font><glyph glyph-name=""#
        .to_vec();
    font.push(0xE9);
    font.extend_from_slice(br#"" unicode="o" d="M8 8"/></font></defs></svg>"#);
    fs::write(root.join("font.svg"), font).unwrap();

    run(&config).unwrap();
    assert_eq!(listing(&config.out_dir), vec!["c-8.svg"]);
    assert_eq!(fs::read_to_string(config.out_dir.join("c-8.svg")).unwrap(), render_svg("M8 8"));
}

#[test]
fn test_missing_output_directory() {
    let (root, mut config) = workspace(&svg_font(r#"<glyph unicode="a" d="M1"/>"#));
    config.out_dir = root.join("absent");
    let err = run(&config).unwrap_err();
    assert!(matches!(err, Error::WriteOutput { .. }));
    assert!(!config.out_dir.exists());
}

#[test]
fn test_missing_input() {
    let (root, mut config) = workspace("");
    config.input = root.join("nope.svg");
    let err = run(&config).unwrap_err();
    assert!(matches!(err, Error::ReadInput { ref path, .. } if path == &config.input));
}

#[test]
fn test_malformed_input() {
    let (_root, config) = workspace(r#"<svg xmlns="http://www.w3.org/2000/svg"><defs></svg>"#);
    let err = run(&config).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert!(listing(&config.out_dir).is_empty());
}
