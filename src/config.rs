use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Landscape A4 in points.
pub const A4_LANDSCAPE: (f32, f32) = (841.89, 595.28);

/// Fixed physical page. All positions are PDF points with the origin at the
/// bottom-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    /// Inset of the decorative border from every page edge
    pub margin: f32,
    /// Distance from the top edge to the cursor after a page break
    pub top_margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry {
            width: A4_LANDSCAPE.0,
            height: A4_LANDSCAPE.1,
            margin: 40.0,
            top_margin: 80.0,
        }
    }
}

impl PageGeometry {
    pub fn content_top(&self) -> f32 {
        self.height - self.top_margin
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderPolicy {
    FirstPage,
    EveryPage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignaturePolicy {
    /// Start a fresh page when the table has run into the signature area,
    /// so the block always lands clear of content on the final page.
    LastPage,
    /// Draw on whatever page the cursor occupies, even if it overlaps rows.
    CurrentPage,
}

/// Bilingual labels. Header labels include their trailing separator because
/// the value is drawn right where the measured label ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub date: String,
    pub sender_store: String,
    pub sender_name: String,
    pub receiver_store: String,
    pub receiver_name: String,
    pub notes: String,
    pub items_heading: String,
    pub code_column: String,
    pub description_column: String,
    pub quantity_column: String,
    pub total_items: String,
    pub sender_signature: String,
    pub receiver_signature: String,
    pub signature_date: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            date: "日期 Date: ".into(),
            sender_store: "寄出店別 From Store: ".into(),
            sender_name: "寄件人 Sender: ".into(),
            receiver_store: "收件店別 To Store: ".into(),
            receiver_name: "收件人 Receiver: ".into(),
            notes: "備註 Notes: ".into(),
            items_heading: "物品清單 Items List:".into(),
            code_column: "Article No".into(),
            description_column: "Description".into(),
            quantity_column: "Quantity".into(),
            total_items: "Total Items / 總項目數: ".into(),
            sender_signature: "寄件人簽名 Sender Signature:".into(),
            receiver_signature: "收件人簽名 Receiver Signature:".into(),
            signature_date: "日期 Date:".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleLayout {
    pub text: String,
    pub size: f32,
    /// Baseline distance from the top edge
    pub offset: f32,
}

impl Default for TitleLayout {
    fn default() -> Self {
        TitleLayout {
            text: "Transfer Document / 調貨單".into(),
            size: 20.0,
            offset: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderLayout {
    /// Baseline of the first header line, measured from the top edge
    pub offset: f32,
    pub size: f32,
    pub line_height: f32,
    /// Extra space after the last header line
    pub gap: f32,
}

impl Default for HeaderLayout {
    fn default() -> Self {
        HeaderLayout {
            offset: 100.0,
            size: 14.0,
            line_height: 26.0,
            gap: 10.0,
        }
    }
}

/// Column x-offsets, relative to the content left edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub code: f32,
    pub description: f32,
    pub quantity: f32,
}

impl Default for Columns {
    fn default() -> Self {
        Columns {
            code: 0.0,
            description: 120.0,
            quantity: 500.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    pub heading_size: f32,
    /// Advance after the section heading
    pub heading_gap: f32,
    pub column_size: f32,
    pub columns: Columns,
    /// The rule sits this far below the column header baseline
    pub rule_drop: f32,
    /// Advance from the rule to the first row baseline
    pub rule_gap: f32,
    pub row_size: f32,
    pub row_height: f32,
    /// Lowest baseline a row may occupy; below it the table breaks the page
    pub row_floor: f32,
    /// Descriptions longer than this many characters are cut
    pub description_cap: usize,
    pub ellipsis: String,
}

impl Default for TableLayout {
    fn default() -> Self {
        TableLayout {
            heading_size: 16.0,
            heading_gap: 30.0,
            column_size: 12.0,
            columns: Columns::default(),
            rule_drop: 5.0,
            rule_gap: 20.0,
            row_size: 10.0,
            row_height: 20.0,
            row_floor: 100.0,
            description_cap: 40,
            ellipsis: "...".into(),
        }
    }
}

/// Sender/receiver signature block, anchored to the bottom of the page.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureLayout {
    /// Baseline height of the full-width separator rule
    pub separator_y: f32,
    /// Separator inset from the page edges
    pub separator_inset: f32,
    pub size: f32,
    /// Drop from the separator to the signature labels
    pub label_drop: f32,
    /// Drop from the signature labels to the date labels
    pub date_drop: f32,
    /// Signature rule starts this far right of its label
    pub line_indent: f32,
    pub date_line_indent: f32,
    pub date_line_length: f32,
    /// Receiver column starts this far right of the page centre
    pub right_column_offset: f32,
    /// Sender signature rule stops this far short of the receiver column
    pub column_gap: f32,
    /// Underlines sit this far below their label baseline
    pub underline_drop: f32,
}

impl Default for SignatureLayout {
    fn default() -> Self {
        SignatureLayout {
            separator_y: 150.0,
            separator_inset: 60.0,
            size: 14.0,
            label_drop: 40.0,
            date_drop: 35.0,
            line_indent: 220.0,
            date_line_indent: 80.0,
            date_line_length: 120.0,
            right_column_offset: 50.0,
            column_gap: 30.0,
            underline_drop: 5.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterLayout {
    /// Stamp text; nothing is drawn when absent
    pub text: Option<String>,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl Default for FooterLayout {
    fn default() -> Self {
        FooterLayout {
            text: None,
            x: 60.0,
            y: 25.0,
            size: 10.0,
        }
    }
}

/// Every position the layout engine uses. Nothing in the engine is hard-coded;
/// the near-duplicate document variants are presets of this one value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page: PageGeometry,
    /// Content left edge
    pub left: f32,
    /// Rules end this far from the right page edge
    pub right_inset: f32,
    pub title: TitleLayout,
    pub header: HeaderLayout,
    pub table: TableLayout,
    pub totals: bool,
    pub border: BorderPolicy,
    pub signature: SignatureLayout,
    pub signature_policy: SignaturePolicy,
    pub footer: FooterLayout,
    pub labels: Labels,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig::standard()
    }
}

impl LayoutConfig {
    /// Header block with bold inline values, 40-character descriptions and a
    /// border on every page.
    pub fn standard() -> Self {
        LayoutConfig {
            page: PageGeometry::default(),
            left: 80.0,
            right_inset: 80.0,
            title: TitleLayout::default(),
            header: HeaderLayout::default(),
            table: TableLayout::default(),
            totals: false,
            border: BorderPolicy::EveryPage,
            signature: SignatureLayout::default(),
            signature_policy: SignaturePolicy::LastPage,
            footer: FooterLayout::default(),
            labels: Labels::default(),
        }
    }

    /// Wider descriptions, a total item count and a first-page border.
    pub fn itemized() -> Self {
        let mut config = LayoutConfig::standard();
        config.left = 60.0;
        config.right_inset = 60.0;
        config.table.columns.description = 160.0;
        config.table.columns.quantity = 590.0;
        config.table.description_cap = 60;
        config.totals = true;
        config.border = BorderPolicy::FirstPage;
        config
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
        })?;
        Self::from_json(&json)
    }

    /// Right end of horizontal rules.
    pub fn rule_end(&self) -> f32 {
        self.page.width - self.right_inset
    }

    /// How many rows fit on a page that starts with redrawn column headers.
    pub fn rows_per_continuation_page(&self) -> usize {
        let first_row = self.page.content_top() - self.table.rule_drop - self.table.rule_gap;
        rows_between(first_row, self.table.row_floor, self.table.row_height)
    }
}

/// Number of baselines `top, top - step, ...` that stay at or above `floor`.
pub(crate) fn rows_between(top: f32, floor: f32, step: f32) -> usize {
    if top < floor || step <= 0.0 {
        return 0;
    }
    ((top - floor) / step).floor() as usize + 1
}
