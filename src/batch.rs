use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::LayoutConfig;
use crate::error::Error;
use crate::fonts::FontSet;
use crate::model::DocumentRecord;
use crate::naming::{FileNaming, find_collisions};
use crate::output::write_atomic;

/// Outcome of a batch run. `failed` holds 1-based record positions.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub succeeded: Vec<String>,
    pub failed: Vec<(usize, Error)>,
}

impl BatchResult {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Renders a sequence of records into one file each, in input order.
pub struct BatchRunner<'a> {
    config: &'a LayoutConfig,
    fonts: &'a FontSet,
    naming: &'a FileNaming,
    overwrite: bool,
}

impl<'a> BatchRunner<'a> {
    pub fn new(config: &'a LayoutConfig, fonts: &'a FontSet, naming: &'a FileNaming) -> Self {
        BatchRunner {
            config,
            fonts,
            naming,
            overwrite: false,
        }
    }

    /// Allow replacing files that already exist in the output directory.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Derive every target path before anything is written. Fails when two
    /// records would share a name.
    pub fn plan(&self, records: &[DocumentRecord], output_dir: &Path) -> Result<Vec<PathBuf>, Error> {
        let names: Vec<String> = records
            .iter()
            .enumerate()
            .map(|(i, record)| self.naming.derive(record, Some(i + 1)))
            .collect();

        if let Some((name, indices)) = find_collisions(&names).into_iter().next() {
            return Err(Error::Collision { name, indices });
        }

        Ok(names.iter().map(|name| output_dir.join(name)).collect())
    }

    /// Render and write every record. Only a name collision fails the whole
    /// run, before anything is written. Every other problem is per record:
    /// a render or write failure, or a target that already exists while
    /// overwriting is off (`Error::Exists`, the file is left untouched), is
    /// recorded in `failed` and the next record proceeds.
    pub fn run(&self, records: &[DocumentRecord], output_dir: &Path) -> Result<BatchResult, Error> {
        let t0 = Instant::now();
        let paths = self.plan(records, output_dir)?;
        let mut result = BatchResult::default();

        for (i, (record, path)) in records.iter().zip(&paths).enumerate() {
            let index = i + 1;
            let outcome = if !self.overwrite && path.exists() {
                Err(Error::Exists(path.clone()))
            } else {
                crate::render_document(record, self.config, self.fonts)
                    .and_then(|bytes| write_atomic(path, &bytes))
            };
            match outcome {
                Ok(()) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    log::debug!("Batch record {index}: wrote {name}");
                    result.succeeded.push(name);
                }
                Err(e) => {
                    log::warn!("Batch record {index} failed: {e}");
                    result.failed.push((index, e));
                }
            }
        }

        log::info!(
            "Batch: {} records, {} written, {} failed in {:.1}ms",
            records.len(),
            result.succeeded.len(),
            result.failed.len(),
            t0.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(result)
    }
}
