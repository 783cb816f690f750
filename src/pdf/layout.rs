use crate::config::{BorderPolicy, LayoutConfig, SignaturePolicy};
use crate::error::Error;
use crate::fonts::{FontRole, FontSet};
use crate::model::DocumentRecord;

use super::{DrawOp, PageCanvas};
use super::table::draw_item_table;

/// Turns a [`DocumentRecord`] into draw calls on a [`PageCanvas`]. Holds no
/// per-record state, so one engine can render any number of documents.
pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        LayoutEngine { config }
    }

    pub fn config(&self) -> &'a LayoutConfig {
        self.config
    }

    /// Draw the whole document onto `canvas`. The caller finishes the canvas.
    ///
    /// Order: title, header block, item table, totals, border, signature
    /// block, footer stamp.
    pub fn render(
        &self,
        record: &DocumentRecord,
        canvas: &mut PageCanvas,
        fonts: &FontSet,
    ) -> Result<(), Error> {
        canvas.begin_page();
        self.draw_title(canvas, fonts)?;
        self.draw_header(record, canvas, fonts)?;

        if !record.items.is_empty() {
            draw_item_table(self, &record.items, canvas);
        }
        if self.config.totals {
            self.draw_totals(record.items.len(), canvas);
        }

        if self.config.signature_policy == SignaturePolicy::LastPage
            && content_bottom(canvas, fonts)?
                .is_some_and(|bottom| bottom < self.config.signature.separator_y)
        {
            self.break_page(canvas);
        }
        self.draw_border(canvas);
        self.draw_signature(canvas);
        self.draw_footer(canvas);
        Ok(())
    }

    /// Leave the current page (drawing its border if the policy wants one)
    /// and continue on a fresh page.
    pub(super) fn break_page(&self, canvas: &mut PageCanvas) {
        self.draw_border(canvas);
        canvas.new_page();
    }

    fn draw_border(&self, canvas: &mut PageCanvas) {
        let wanted = match self.config.border {
            BorderPolicy::EveryPage => true,
            BorderPolicy::FirstPage => canvas.page_index() == 0,
        };
        if wanted {
            let g = self.config.page;
            canvas.draw_rect(g.margin, g.margin, g.width - 2.0 * g.margin, g.height - 2.0 * g.margin);
        }
    }

    fn draw_title(&self, canvas: &mut PageCanvas, fonts: &FontSet) -> Result<(), Error> {
        let title = &self.config.title;
        let width = fonts.measure(&title.text, FontRole::Bold, title.size)?;
        let x = ((self.config.page.width - width) / 2.0).max(0.0);
        let y = self.config.page.height - title.offset;
        canvas.draw_text(x, y, &title.text, FontRole::Bold, title.size);
        Ok(())
    }

    /// Label in the body font, value in bold starting where the measured
    /// label ends, both on one baseline.
    fn draw_header(
        &self,
        record: &DocumentRecord,
        canvas: &mut PageCanvas,
        fonts: &FontSet,
    ) -> Result<(), Error> {
        let header = &self.config.header;
        let labels = &self.config.labels;
        let mut fields = vec![
            (labels.date.as_str(), record.date.as_str()),
            (labels.sender_store.as_str(), record.sender_store.as_str()),
            (labels.sender_name.as_str(), record.sender_name.as_str()),
            (labels.receiver_store.as_str(), record.receiver_store.as_str()),
            (labels.receiver_name.as_str(), record.receiver_name.as_str()),
        ];
        if let Some(notes) = record.printable_notes() {
            fields.push((labels.notes.as_str(), notes));
        }

        canvas.set_cursor(self.config.page.height - header.offset);
        let x = self.config.left;
        for (label, value) in fields {
            let y = canvas.cursor();
            canvas.draw_text(x, y, label, FontRole::Body, header.size);
            let label_width = fonts.measure(label, FontRole::Body, header.size)?;
            canvas.draw_text(x + label_width, y, value, FontRole::Bold, header.size);
            canvas.advance(header.line_height);
        }
        canvas.advance(header.gap);
        Ok(())
    }

    fn draw_totals(&self, count: usize, canvas: &mut PageCanvas) {
        let t = &self.config.table;
        if canvas.cursor() - 2.0 * t.row_height < t.row_floor {
            self.break_page(canvas);
        }
        canvas.advance(t.row_height);
        let y = canvas.cursor();
        canvas.draw_line(self.config.left, y, self.config.rule_end(), y);
        canvas.advance(t.row_height);
        let text = format!("{}{}", self.config.labels.total_items, count);
        canvas.draw_text(self.config.left, canvas.cursor(), &text, FontRole::Body, t.column_size);
        canvas.advance(t.row_height);
    }

    /// Sender and receiver columns at a fixed height above the bottom edge,
    /// each with a signature rule and a date rule.
    fn draw_signature(&self, canvas: &mut PageCanvas) {
        let sig = &self.config.signature;
        let labels = &self.config.labels;
        let width = self.config.page.width;

        canvas.draw_line(
            sig.separator_inset,
            sig.separator_y,
            width - sig.separator_inset,
            sig.separator_y,
        );

        let label_y = sig.separator_y - sig.label_drop;
        let date_y = label_y - sig.date_drop;
        let left_x = self.config.left;
        let right_x = width / 2.0 + sig.right_column_offset;

        for (x, label, line_end) in [
            (left_x, &labels.sender_signature, right_x - sig.column_gap),
            (right_x, &labels.receiver_signature, self.config.rule_end()),
        ] {
            canvas.draw_text(x, label_y, label, FontRole::Body, sig.size);
            canvas.draw_line(
                x + sig.line_indent,
                label_y - sig.underline_drop,
                line_end,
                label_y - sig.underline_drop,
            );
            canvas.draw_text(x, date_y, &labels.signature_date, FontRole::Body, sig.size);
            let date_line_x = x + sig.date_line_indent;
            canvas.draw_line(
                date_line_x,
                date_y - sig.underline_drop,
                date_line_x + sig.date_line_length,
                date_y - sig.underline_drop,
            );
        }
        canvas.set_cursor(date_y - sig.size);
    }

    fn draw_footer(&self, canvas: &mut PageCanvas) {
        let footer = &self.config.footer;
        if let Some(text) = footer.text.as_deref() {
            canvas.draw_text(footer.x, footer.y, text, FontRole::Body, footer.size);
        }
    }
}

/// Lowest point content reaches on the current page: text counts its
/// descender, lines their lower end. The border is not content. `None` when
/// nothing has been drawn yet.
fn content_bottom(canvas: &PageCanvas, fonts: &FontSet) -> Result<Option<f32>, Error> {
    let Some(page) = canvas.pages().last() else {
        return Ok(None);
    };
    let mut bottom: Option<f32> = None;
    for op in &page.ops {
        let low = match op {
            DrawOp::Text { y, role, size, .. } => y - fonts.descent(*role)? * size,
            DrawOp::Line { from, to } => from.1.min(to.1),
            DrawOp::Rect { .. } => continue,
        };
        bottom = Some(bottom.map_or(low, |b| b.min(low)));
    }
    Ok(bottom)
}
