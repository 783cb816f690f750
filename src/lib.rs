mod batch;
mod catalog;
mod config;
mod error;
mod fonts;
mod model;
mod naming;
mod open;
mod output;
mod pdf;

pub use batch::{BatchResult, BatchRunner};
pub use catalog::Catalog;
pub use config::{
    A4_LANDSCAPE, BorderPolicy, Columns, FooterLayout, HeaderLayout, Labels, LayoutConfig,
    PageGeometry, SignatureLayout, SignaturePolicy, TableLayout, TitleLayout,
};
pub use error::Error;
pub use fonts::{
    BuiltinFont, FontCandidate, FontFace, FontResolver, FontRole, FontSet, LoadedFont,
    system_fonts,
};
pub use model::{DocumentRecord, ItemLine, load_records, parse_records};
pub use naming::{FileNaming, find_collisions};
pub use open::{Opener, SystemOpener};
pub use output::write_atomic;
pub use pdf::{DrawOp, LayoutEngine, Page, PageCanvas, truncate_description};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Lay out `record` and return the finished PDF bytes. Nothing touches the
/// filesystem, so the same inputs always give the same pages.
pub fn render_document(
    record: &DocumentRecord,
    config: &LayoutConfig,
    fonts: &FontSet,
) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    let mut canvas = PageCanvas::new(config.page);
    LayoutEngine::new(config).render(record, &mut canvas, fonts)?;
    let pages = canvas.page_count();
    let t_layout = t0.elapsed();

    let bytes = canvas.finish(fonts)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: layout={:.1}ms, serialize={:.1}ms, total={:.1}ms ({} pages, {} bytes)",
        t_layout.as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        pages,
        bytes.len(),
    );

    Ok(bytes)
}

/// Render `record` and write it into `output_dir` under its derived name.
/// Returns the path written.
pub fn write_document(
    record: &DocumentRecord,
    config: &LayoutConfig,
    fonts: &FontSet,
    naming: &FileNaming,
    output_dir: &Path,
    overwrite: bool,
) -> Result<PathBuf, Error> {
    let path = output_dir.join(naming.derive(record, None));
    if !overwrite && path.exists() {
        return Err(Error::Exists(path));
    }

    let bytes = render_document(record, config, fonts)?;
    write_atomic(&path, &bytes)?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}
