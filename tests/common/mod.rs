#![allow(dead_code)]

use transfer_pdf::{
    DocumentRecord, DrawOp, FontRole, FontSet, ItemLine, LayoutConfig, LayoutEngine, Page,
    PageCanvas,
};

pub fn record(items: usize) -> DocumentRecord {
    DocumentRecord {
        date: "2024/05/01".into(),
        sender_store: "A1".into(),
        sender_name: "Amy".into(),
        receiver_store: "B2".into(),
        receiver_name: "Ben".into(),
        notes: None,
        items: (1..=items)
            .map(|i| ItemLine::new(format!("X{i}"), format!("Item number {i}"), "1"))
            .collect(),
    }
}

/// Lay out `record` on a fresh canvas with the builtin fonts.
pub fn layout(record: &DocumentRecord, config: &LayoutConfig) -> PageCanvas {
    let _ = env_logger::try_init();
    let mut canvas = PageCanvas::new(config.page);
    LayoutEngine::new(config)
        .render(record, &mut canvas, &FontSet::builtin())
        .expect("layout should succeed");
    canvas
}

/// (x, y, text, role) of every text op on the page.
pub fn texts(page: &Page) -> Vec<(f32, f32, String, FontRole)> {
    page.ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text {
                x, y, text, role, ..
            } => Some((*x, *y, text.clone(), *role)),
            _ => None,
        })
        .collect()
}

pub fn find_text<'a>(page: &'a Page, needle: &str) -> Option<&'a DrawOp> {
    page.ops
        .iter()
        .find(|op| matches!(op, DrawOp::Text { text, .. } if text == needle))
}

pub fn page_has_text(page: &Page, needle: &str) -> bool {
    page.texts().any(|t| t == needle)
}

pub fn rect_count(page: &Page) -> usize {
    page.ops
        .iter()
        .filter(|op| matches!(op, DrawOp::Rect { .. }))
        .count()
}

/// Item codes drawn on the page, in drawing order.
pub fn item_codes(page: &Page) -> Vec<String> {
    page.texts()
        .filter(|t| t.starts_with('X') && t[1..].chars().all(|c| c.is_ascii_digit()) && t.len() > 1)
        .map(str::to_string)
        .collect()
}
