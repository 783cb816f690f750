use crate::config::LayoutConfig;
use crate::fonts::FontRole;
use crate::model::ItemLine;

use super::PageCanvas;
use super::layout::LayoutEngine;

/// Cut `text` to `cap` characters and append `ellipsis`. Text at or under the
/// cap is returned unchanged. Counts Unicode scalar values, not bytes.
pub fn truncate_description(text: &str, cap: usize, ellipsis: &str) -> String {
    match text.char_indices().nth(cap) {
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + ellipsis.len());
            out.push_str(&text[..byte_idx]);
            out.push_str(ellipsis);
            out
        }
        None => text.to_string(),
    }
}

/// Column headers followed by the rule underneath them. Leaves the cursor on
/// the first row baseline.
fn draw_column_headers(config: &LayoutConfig, canvas: &mut PageCanvas) {
    let t = &config.table;
    let y = canvas.cursor();
    let labels = &config.labels;
    for (offset, label) in [
        (t.columns.code, &labels.code_column),
        (t.columns.description, &labels.description_column),
        (t.columns.quantity, &labels.quantity_column),
    ] {
        canvas.draw_text(config.left + offset, y, label, FontRole::Body, t.column_size);
    }
    canvas.draw_line(config.left, y - t.rule_drop, config.rule_end(), y - t.rule_drop);
    canvas.advance(t.rule_drop + t.rule_gap);
}

fn draw_row(config: &LayoutConfig, item: &ItemLine, canvas: &mut PageCanvas) {
    let t = &config.table;
    let y = canvas.cursor();
    let description = truncate_description(&item.description, t.description_cap, &t.ellipsis);
    canvas.draw_text(config.left + t.columns.code, y, &item.code, FontRole::Body, t.row_size);
    canvas.draw_text(
        config.left + t.columns.description,
        y,
        &description,
        FontRole::Body,
        t.row_size,
    );
    canvas.draw_text(
        config.left + t.columns.quantity,
        y,
        &item.quantity,
        FontRole::Body,
        t.row_size,
    );
    canvas.advance(t.row_height);
}

/// Section heading, column headers and one row per item, in input order.
/// A row whose baseline would fall under `row_floor` moves to a new page
/// that starts with the column headers again; rows are never split.
pub(super) fn draw_item_table(engine: &LayoutEngine, items: &[ItemLine], canvas: &mut PageCanvas) {
    let config = engine.config();
    let t = &config.table;

    // Heading and column headers must leave room for at least one row
    let lead = t.heading_gap + t.rule_drop + t.rule_gap;
    if canvas.cursor() - lead < t.row_floor {
        engine.break_page(canvas);
    }

    canvas.draw_text(
        config.left,
        canvas.cursor(),
        &config.labels.items_heading,
        FontRole::Body,
        t.heading_size,
    );
    canvas.advance(t.heading_gap);
    draw_column_headers(config, canvas);

    for item in items {
        if canvas.cursor() < t.row_floor {
            engine.break_page(canvas);
            draw_column_headers(config, canvas);
        }
        draw_row(config, item, canvas);
    }
    log::debug!(
        "Item table: {} rows, ends on page {}",
        items.len(),
        canvas.page_index() + 1
    );
}
