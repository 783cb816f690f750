//! Font-file paths of resolution, measurement and embedding. These need a
//! TrueType font on the host and skip when none of the known ones exist.

mod common;

use std::collections::HashMap;
use std::path::PathBuf;

use common::*;
use transfer_pdf::{
    DrawOp, FontCandidate, FontFace, FontResolver, FontRole, FontSet, ItemLine, LayoutConfig,
    LayoutEngine, PageCanvas, render_document,
};

const HOST_FONTS: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    ),
];

// Plane 16 private use; no text font maps it.
const UNMAPPED: char = '\u{10FFFD}';

fn host_font() -> Option<(PathBuf, PathBuf)> {
    let found = HOST_FONTS
        .iter()
        .map(|(regular, bold)| (PathBuf::from(regular), PathBuf::from(bold)))
        .find(|(regular, bold)| regular.is_file() && bold.is_file());
    if found.is_none() {
        eprintln!("no host TrueType font found, skipping");
    }
    found
}

/// Every `/W` array in the document as gid → width (1000 units).
fn cid_widths(pdf: &[u8]) -> Vec<HashMap<u16, f32>> {
    let text = String::from_utf8_lossy(pdf);
    let mut tables = Vec::new();
    for (start, _) in text.match_indices("/W [") {
        let mut table = HashMap::new();
        let mut depth = 1;
        let mut first_gid: Option<u16> = None;
        let mut offset = 0u16;
        let mut token = String::new();
        for ch in text[start + 4..].chars() {
            if ch.is_ascii_digit() || ch == '.' || ch == '-' {
                token.push(ch);
                continue;
            }
            if !token.is_empty() {
                match depth {
                    1 => {
                        first_gid = token.parse().ok();
                        offset = 0;
                    }
                    2 => {
                        if let (Some(gid), Ok(width)) = (first_gid, token.parse::<f32>()) {
                            table.insert(gid + offset, width);
                            offset += 1;
                        }
                    }
                    _ => {}
                }
                token.clear();
            }
            match ch {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        tables.push(table);
    }
    tables
}

#[test]
fn resolves_a_font_file() {
    let _ = env_logger::try_init();
    let Some((regular, bold)) = host_font() else {
        return;
    };
    let set = FontResolver::new(vec![
        FontCandidate::new("/nonexistent/first.ttf"),
        FontCandidate::with_bold(&regular, &bold),
    ])
    .resolve();

    assert!(set.available());
    assert!(!set.body_family().is_empty());
    assert!(!set.bold_family().is_empty());
    assert!(matches!(set.face(FontRole::Body), FontFace::Embedded(f) if f.path == regular));
    assert!(matches!(set.face(FontRole::Bold), FontFace::Embedded(f) if f.path == bold));

    let small = set.measure("Date", FontRole::Body, 10.0).unwrap();
    let large = set.measure("Date", FontRole::Body, 20.0).unwrap();
    assert!(small > 0.0);
    assert!((large - 2.0 * small).abs() < 1e-3);
    assert!(set.descent(FontRole::Body).unwrap() > 0.0);
}

#[test]
fn missing_bold_sibling_shares_the_regular_file() {
    let Some((regular, _)) = host_font() else {
        return;
    };
    let set = FontResolver::new(vec![FontCandidate::with_bold(
        &regular,
        "/nonexistent/bold.ttf",
    )])
    .resolve();
    assert!(set.available());
    assert_eq!(set.body_family(), set.bold_family());

    let bytes = render_document(&record(2), &LayoutConfig::standard(), &set).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/F1"));
    assert!(!text.contains("/F2"));
    assert_eq!(text.matches("/Type0").count(), 1);
}

#[test]
fn bold_sibling_is_embedded_separately() {
    let Some((regular, bold)) = host_font() else {
        return;
    };
    let set = FontResolver::new(vec![FontCandidate::with_bold(&regular, &bold)]).resolve();

    let bytes = render_document(&record(2), &LayoutConfig::standard(), &set).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(bytes.starts_with(b"%PDF"));
    assert!(text.contains("/F2"));
    assert_eq!(text.matches("/Type0").count(), 2);
    assert!(text.contains("/Identity-H"));
    assert!(text.contains("/ToUnicode"));
}

#[test]
fn missing_glyphs_measure_what_they_draw() {
    let Some((regular, _)) = host_font() else {
        return;
    };
    let set = FontResolver::new(vec![FontCandidate::new(&regular)]).resolve();
    let size = 10.0;
    let measured = set.measure(&UNMAPPED.to_string(), FontRole::Body, size).unwrap();

    let mut rec = record(0);
    rec.items.push(ItemLine::new("X1", format!("{UNMAPPED}{UNMAPPED}"), "1"));
    let bytes = render_document(&rec, &LayoutConfig::standard(), &set).unwrap();

    let tables = cid_widths(&bytes);
    assert_eq!(tables.len(), 1);
    let notdef = tables[0]
        .get(&0)
        .copied()
        .expect("glyph 0 needs an explicit width");
    assert!(
        (notdef * size / 1000.0 - measured).abs() < 1e-2,
        "measured {measured}, /W gives {notdef}"
    );
}

#[test]
fn label_widths_come_from_the_embedded_face() {
    let Some((regular, bold)) = host_font() else {
        return;
    };
    let fonts: FontSet = FontResolver::new(vec![FontCandidate::with_bold(&regular, &bold)]).resolve();
    let config = LayoutConfig::standard();
    let mut canvas = PageCanvas::new(config.page);
    LayoutEngine::new(&config)
        .render(&record(1), &mut canvas, &fonts)
        .unwrap();

    let page = &canvas.pages()[0];
    let label = &config.labels.date;
    let Some(DrawOp::Text { x: lx, .. }) = find_text(page, label) else {
        panic!("date label missing");
    };
    let Some(DrawOp::Text { x: vx, .. }) = find_text(page, "2024/05/01") else {
        panic!("date value missing");
    };
    let width = fonts.measure(label, FontRole::Body, config.header.size).unwrap();
    assert!(width > 0.0);
    assert!((vx - (lx + width)).abs() < 1e-3);
}
