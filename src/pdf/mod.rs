mod layout;
mod table;

use std::collections::HashSet;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::config::PageGeometry;
use crate::error::Error;
use crate::fonts::{FontEntry, FontRole, FontSet, register_font};

pub use layout::LayoutEngine;
pub use table::truncate_description;

/// One recorded drawing instruction. Coordinates are PDF points.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        role: FontRole,
        size: f32,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text of every text op on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Fixed-size drawing surface for one page stream. Draw calls are recorded
/// per page and turned into PDF objects by [`PageCanvas::finish`].
pub struct PageCanvas {
    geometry: PageGeometry,
    pages: Vec<Page>,
    cursor: f32,
}

impl PageCanvas {
    pub fn new(geometry: PageGeometry) -> Self {
        PageCanvas {
            geometry,
            pages: Vec::new(),
            cursor: geometry.content_top(),
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Opens the first page if none exists and puts the cursor at the top of
    /// the content area.
    pub fn begin_page(&mut self) {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        self.cursor = self.geometry.content_top();
    }

    /// Closes the current page and continues on a fresh one. Pages drawn so
    /// far are kept.
    pub fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.begin_page();
    }

    /// Vertical position of the next baseline.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn set_cursor(&mut self, y: f32) {
        self.cursor = y;
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor -= dy;
    }

    /// 0-based index of the page being drawn on.
    pub fn page_index(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    fn current(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.begin_page();
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn draw_text(&mut self, x: f32, y: f32, text: &str, role: FontRole, size: f32) {
        self.current().ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            role,
            size,
        });
    }

    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        self.current().ops.push(DrawOp::Line {
            from: (x0, y0),
            to: (x1, y1),
        });
    }

    pub fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.current().ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
        });
    }

    /// Serialize every page into a complete PDF. Consumes the canvas.
    pub fn finish(mut self, fonts: &FontSet) -> Result<Vec<u8>, Error> {
        let t0 = std::time::Instant::now();
        if self.pages.is_empty() {
            self.begin_page();
        }

        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();

        // Phase 1: fonts, subset to the characters each role actually draws
        let mut used_body: HashSet<char> = HashSet::new();
        let mut used_bold: HashSet<char> = HashSet::new();
        for op in self.pages.iter().flat_map(|p| p.ops.iter()) {
            if let DrawOp::Text { text, role, .. } = op {
                match role {
                    FontRole::Body => used_body.extend(text.chars()),
                    FontRole::Bold => used_bold.extend(text.chars()),
                }
            }
        }
        let shared = fonts.face(FontRole::Body).same_source(fonts.face(FontRole::Bold));
        if shared {
            used_body.extend(used_bold.iter().copied());
        }
        used_body.insert(' ');
        used_bold.insert(' ');

        let body = register_font(
            &mut pdf,
            fonts.face(FontRole::Body),
            "F1".to_string(),
            &used_body,
            &mut alloc,
        )?;
        let bold = if shared {
            None
        } else {
            Some(register_font(
                &mut pdf,
                fonts.face(FontRole::Bold),
                "F2".to_string(),
                &used_bold,
                &mut alloc,
            )?)
        };

        let t_fonts = t0.elapsed();

        // Phase 2: one compressed content stream per page
        let n = self.pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        for (i, page) in self.pages.iter().enumerate() {
            let mut content = Content::new();
            let mut cur_font: Option<(FontRole, f32)> = None;
            for op in &page.ops {
                match op {
                    DrawOp::Text {
                        x,
                        y,
                        text,
                        role,
                        size,
                    } => {
                        if text.is_empty() {
                            continue;
                        }
                        let entry = entry_for(*role, &body, bold.as_ref());
                        let bytes = entry.encode(text);
                        content.begin_text();
                        if cur_font != Some((*role, *size)) {
                            content.set_font(Name(entry.pdf_name.as_bytes()), *size);
                            cur_font = Some((*role, *size));
                        }
                        content.next_line(*x, *y);
                        content.show(Str(&bytes));
                        content.end_text();
                    }
                    DrawOp::Line { from, to } => {
                        content.move_to(from.0, from.1);
                        content.line_to(to.0, to.1);
                        content.stroke();
                    }
                    DrawOp::Rect {
                        x,
                        y,
                        width,
                        height,
                    } => {
                        content.rect(*x, *y, *width, *height);
                        content.stroke();
                    }
                }
            }
            let raw = content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);
        pdf.document_info(info_id)
            .producer(TextStr(concat!("transfer-pdf ", env!("CARGO_PKG_VERSION"))));

        let mut font_pairs = vec![(body.pdf_name.clone(), body.font_ref)];
        if let Some(ref entry) = bold {
            font_pairs.push((entry.pdf_name.clone(), entry.font_ref));
        }

        let g = self.geometry;
        for i in 0..n {
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, g.width, g.height))
                .parent(pages_id)
                .contents(content_ids[i]);
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            for (name, font_ref) in &font_pairs {
                fonts.pair(Name(name.as_bytes()), *font_ref);
            }
        }

        log::info!(
            "PDF assembly: {} pages, font_embed={:.1}ms, total={:.1}ms",
            n,
            t_fonts.as_secs_f64() * 1000.0,
            t0.elapsed().as_secs_f64() * 1000.0,
        );

        Ok(pdf.finish())
    }
}

fn entry_for<'a>(role: FontRole, body: &'a FontEntry, bold: Option<&'a FontEntry>) -> &'a FontEntry {
    match (role, bold) {
        (FontRole::Bold, Some(entry)) => entry,
        _ => body,
    }
}
