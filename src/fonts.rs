use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::{Face, GlyphId};

use crate::error::Error;

/// Logical font a piece of text is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontRole {
    Body,
    Bold,
}

/// The standard-14 faces used when no font file could be registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

impl BuiltinFont {
    pub fn base_font(self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Advance of one character in 1000-units. Characters outside WinAnsi
    /// cannot be shown with a builtin font and measure as zero.
    fn char_width_1000(self, ch: char) -> f32 {
        let byte = char_to_winansi(ch);
        let table = match self {
            BuiltinFont::Helvetica => &HELVETICA_WIDTHS,
            BuiltinFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match byte {
            0..=31 => 0.0,
            32..=126 => table[(byte - 32) as usize] as f32,
            _ => 556.0,
        }
    }
}

// AFM advances for WinAnsi 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// A font file that parsed successfully and can be embedded.
pub struct LoadedFont {
    pub path: PathBuf,
    pub face_index: u32,
    pub family: String,
    data: Mmap,
}

impl LoadedFont {
    fn face(&self) -> Result<Face<'_>, Error> {
        Face::parse(&self.data, self.face_index).map_err(|e| {
            Error::Measurement(format!("{}: {e}", self.path.display()))
        })
    }
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("path", &self.path)
            .field("face_index", &self.face_index)
            .field("family", &self.family)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub enum FontFace {
    Embedded(Arc<LoadedFont>),
    Builtin(BuiltinFont),
}

impl FontFace {
    pub fn family(&self) -> &str {
        match self {
            FontFace::Embedded(font) => &font.family,
            FontFace::Builtin(builtin) => builtin.base_font(),
        }
    }

    pub(crate) fn same_source(&self, other: &FontFace) -> bool {
        match (self, other) {
            (FontFace::Embedded(a), FontFace::Embedded(b)) => Arc::ptr_eq(a, b),
            (FontFace::Builtin(a), FontFace::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

/// Outcome of font resolution: what the body and bold roles draw with.
/// Resolved once and then shared read-only by every render.
#[derive(Clone, Debug)]
pub struct FontSet {
    body: FontFace,
    bold: FontFace,
    available: bool,
}

impl FontSet {
    /// Builtin Helvetica pair; always available, needs no files.
    pub fn builtin() -> Self {
        FontSet {
            body: FontFace::Builtin(BuiltinFont::Helvetica),
            bold: FontFace::Builtin(BuiltinFont::HelveticaBold),
            available: false,
        }
    }

    /// True when a font file was registered, false when running on the
    /// builtin fallback.
    pub fn available(&self) -> bool {
        self.available
    }

    pub fn face(&self, role: FontRole) -> &FontFace {
        match role {
            FontRole::Body => &self.body,
            FontRole::Bold => &self.bold,
        }
    }

    pub fn body_family(&self) -> &str {
        self.body.family()
    }

    pub fn bold_family(&self) -> &str {
        self.bold.family()
    }

    /// Depth of the descender below the baseline, as a fraction of the font
    /// size.
    pub fn descent(&self, role: FontRole) -> Result<f32, Error> {
        match self.face(role) {
            // Helvetica and Helvetica-Bold AFM: Descender -207
            FontFace::Builtin(_) => Ok(0.207),
            FontFace::Embedded(font) => {
                let face = font.face()?;
                Ok(-(face.descender() as f32) / face.units_per_em() as f32)
            }
        }
    }

    /// Rendered width of `text` in points. Deterministic for a given set.
    pub fn measure(&self, text: &str, role: FontRole, size: f32) -> Result<f32, Error> {
        if !size.is_finite() || size <= 0.0 {
            return Err(Error::Measurement(format!("invalid font size {size}")));
        }
        match self.face(role) {
            FontFace::Builtin(builtin) => Ok(text
                .chars()
                .map(|ch| builtin.char_width_1000(ch) * size / 1000.0)
                .sum()),
            FontFace::Embedded(font) => {
                let face = font.face()?;
                let scale = size / face.units_per_em() as f32;
                Ok(text
                    .chars()
                    .map(|ch| char_advance(&face, ch) as f32 * scale)
                    .sum())
            }
        }
    }
}

/// A font file to try, with an optional bold sibling.
#[derive(Clone, Debug, PartialEq)]
pub struct FontCandidate {
    pub regular: PathBuf,
    pub bold: Option<PathBuf>,
}

impl FontCandidate {
    pub fn new(regular: impl Into<PathBuf>) -> Self {
        FontCandidate {
            regular: regular.into(),
            bold: None,
        }
    }

    pub fn with_bold(regular: impl Into<PathBuf>, bold: impl Into<PathBuf>) -> Self {
        FontCandidate {
            regular: regular.into(),
            bold: Some(bold.into()),
        }
    }
}

/// Walks an ordered candidate list and registers the first usable font.
pub struct FontResolver {
    candidates: Vec<FontCandidate>,
}

static SYSTEM_FONTS: OnceLock<FontSet> = OnceLock::new();

/// Font set for this host, resolved on first use and cached for the process.
pub fn system_fonts() -> &'static FontSet {
    SYSTEM_FONTS.get_or_init(|| FontResolver::system().resolve())
}

impl FontResolver {
    pub fn new(candidates: Vec<FontCandidate>) -> Self {
        FontResolver { candidates }
    }

    /// Files from `TRANSFER_PDF_FONTS` first, then the platform list.
    pub fn system() -> Self {
        let mut candidates: Vec<FontCandidate> = Vec::new();
        if let Ok(val) = std::env::var("TRANSFER_PDF_FONTS") {
            let sep = if cfg!(windows) { ';' } else { ':' };
            for part in val.split(sep) {
                let trimmed = part.trim();
                if !trimmed.is_empty() {
                    candidates.push(FontCandidate::new(trimmed));
                }
            }
        }
        candidates.extend(platform_candidates());
        FontResolver { candidates }
    }

    pub fn candidates(&self) -> &[FontCandidate] {
        &self.candidates
    }

    /// Never fails: unusable candidates are skipped and, when none is left,
    /// the builtin Helvetica pair is returned.
    pub fn resolve(&self) -> FontSet {
        let t0 = std::time::Instant::now();
        for candidate in &self.candidates {
            if !candidate.regular.is_file() {
                log::debug!("Font candidate missing: {}", candidate.regular.display());
                continue;
            }
            let regular = match load_font(&candidate.regular) {
                Ok(font) => Arc::new(font),
                Err(reason) => {
                    log::warn!(
                        "Font candidate {} could not be registered: {reason}",
                        candidate.regular.display()
                    );
                    continue;
                }
            };
            let bold = candidate
                .bold
                .as_deref()
                .filter(|path| path.is_file())
                .and_then(|path| match load_font(path) {
                    Ok(font) => Some(Arc::new(font)),
                    Err(reason) => {
                        log::warn!("Bold font {} unusable: {reason}", path.display());
                        None
                    }
                })
                .unwrap_or_else(|| Arc::clone(&regular));

            log::info!(
                "Using font {} (bold: {}) resolved in {:.1}ms",
                regular.path.display(),
                bold.path.display(),
                t0.elapsed().as_secs_f64() * 1000.0,
            );
            return FontSet {
                body: FontFace::Embedded(regular),
                bold: FontFace::Embedded(bold),
                available: true,
            };
        }
        log::warn!("No usable font file found, using builtin Helvetica");
        FontSet::builtin()
    }
}

fn platform_candidates() -> Vec<FontCandidate> {
    #[cfg(target_os = "windows")]
    {
        let dir = std::env::var("WINDIR")
            .map(|windir| PathBuf::from(windir).join("Fonts"))
            .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Fonts"));
        ["msjh.ttc", "msyh.ttc", "simhei.ttf", "simsun.ttc", "kaiti.ttf"]
            .iter()
            .map(|file| FontCandidate::new(dir.join(file)))
            .collect()
    }

    #[cfg(target_os = "macos")]
    {
        vec![
            FontCandidate::new("/System/Library/Fonts/PingFang.ttc"),
            FontCandidate::new("/System/Library/Fonts/Helvetica.ttc"),
            FontCandidate::new("/System/Library/Fonts/Supplemental/Songti.ttc"),
            FontCandidate::new("/System/Library/Fonts/Supplemental/Kaiti.ttc"),
            FontCandidate::new("/Library/Fonts/Microsoft/Microsoft JhengHei.ttf"),
        ]
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let root = Path::new("/usr/share/fonts/truetype");
        vec![
            FontCandidate::with_bold(
                root.join("liberation/LiberationSans-Regular.ttf"),
                root.join("liberation/LiberationSans-Bold.ttf"),
            ),
            FontCandidate::with_bold(
                root.join("dejavu/DejaVuSans.ttf"),
                root.join("dejavu/DejaVuSans-Bold.ttf"),
            ),
            FontCandidate::with_bold(
                root.join("noto/NotoSansCJK-Regular.ttc"),
                root.join("noto/NotoSansCJK-Bold.ttc"),
            ),
        ]
    }
}

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

/// Advance of `ch` in font units. Characters the font has no glyph for are
/// drawn as .notdef and take its advance. Measurement and the embedded /W
/// table both read widths from here.
fn char_advance(face: &Face, ch: char) -> u16 {
    face.glyph_index(ch)
        .and_then(|gid| face.glyph_hor_advance(gid))
        .or_else(|| face.glyph_hor_advance(GlyphId(0)))
        .unwrap_or(0)
}

/// Map the file and check that its first face parses. The mapping stays
/// alive for as long as the font is in use.
fn load_font(path: &Path) -> Result<LoadedFont, String> {
    let file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let data = unsafe { Mmap::map(&file) }.map_err(|e| e.to_string())?;
    let face_index = 0;
    let family = {
        let face = Face::parse(&data, face_index).map_err(|e| e.to_string())?;
        font_family_name(&face).unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Embedded".to_string())
        })
    };
    Ok(LoadedFont {
        path: path.to_path_buf(),
        face_index,
        family,
        data,
    })
}

/// WinAnsi code for `c`; 0 when the builtin fonts cannot show it.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert text to WinAnsi bytes for a builtin font, dropping what cannot be shown.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b != 0)
        .collect()
}

/// Encode text as big-endian 2-byte glyph IDs for CIDFont content streams.
pub(crate) fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

/// Registered PDF font resource: its resource name and, for embedded fonts,
/// the char → subset glyph mapping used to encode text.
pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    pub(crate) char_to_gid: Option<HashMap<char, u16>>,
}

impl FontEntry {
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

/// Write the font objects for one face into the document.
pub(crate) fn register_font(
    pdf: &mut Pdf,
    face: &FontFace,
    pdf_name: String,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<FontEntry, Error> {
    let t0 = std::time::Instant::now();
    let font_ref = alloc();
    let char_to_gid = match face {
        FontFace::Builtin(builtin) => {
            pdf.type1_font(font_ref)
                .base_font(Name(builtin.base_font().as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            None
        }
        FontFace::Embedded(font) => Some(embed_truetype(pdf, font_ref, font, used_chars, alloc)?),
    };
    log::debug!(
        "register_font: {} as {pdf_name} → {:.1}ms",
        face.family(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(FontEntry {
        pdf_name,
        font_ref,
        char_to_gid,
    })
}

/// Type0 font over a CIDFontType2 descendant, Identity-H, subset to `used_chars`.
/// Returns the char → subset glyph id table the content streams encode with.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    font: &LoadedFont,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<HashMap<char, u16>, Error> {
    let face = Face::parse(&font.data, font.face_index)
        .map_err(|e| Error::Pdf(format!("{}: {e}", font.path.display())))?;

    let units = face.units_per_em() as f32;
    let ascent = face.ascender() as f32 / units * 1000.0;
    let descent = face.descender() as f32 / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| h as f32 / units * 1000.0)
        .unwrap_or(700.0);

    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        bb.x_min as f32 / units * 1000.0,
        bb.y_min as f32 / units * 1000.0,
        bb.x_max as f32 / units * 1000.0,
        bb.y_max as f32 / units * 1000.0,
    );

    // Glyph 0 stays at 0 so unmapped characters still show .notdef, with
    // the same advance `FontSet::measure` charges for them
    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let notdef = face.glyph_hor_advance(GlyphId(0)).unwrap_or(0);
    let mut gid_widths: Vec<(u16, f32)> = vec![(0, notdef as f32 / units * 1000.0)];
    let mut chars: Vec<char> = used_chars.iter().copied().collect();
    chars.sort_unstable();
    for ch in chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            gid_widths.push((new_gid, char_advance(&face, ch) as f32 / units * 1000.0));
        }
    }
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let subset_data = subsetter::subset(&font.data, font.face_index, &remapper)
        .unwrap_or_else(|e| {
            log::warn!("Font subsetting failed for {}: {e}, embedding full font", font.family);
            font.data.to_vec()
        });

    let data_len = i32::try_from(subset_data.len())
        .map_err(|_| Error::Pdf(format!("font {} too large to embed", font.family)))?;
    let descriptor_ref = alloc();
    let data_ref = alloc();
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name: String = font.family.chars().filter(|c| !c.is_whitespace()).collect();

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let cid_font_ref = alloc();
    let system_info = pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        let mut w = cid.widths();
        for &(gid, width) in &gid_widths {
            w.consecutive(gid, [width]);
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{}-UTF16", ps_name);
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        },
    );
    for (&ch, &new_gid) in &char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Ok(char_to_gid)
}
