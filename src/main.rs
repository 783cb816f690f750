use std::error::Error as _;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use transfer_pdf::{
    BatchRunner, Catalog, DocumentRecord, Error, FileNaming, FontResolver, LayoutConfig, Opener,
    SystemOpener, load_records, system_fonts, write_document,
};

/// Generate bilingual goods transfer documents as PDF.
#[derive(Parser)]
#[command(name = "transfer-pdf", version, about)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one record to a PDF
    Render {
        /// JSON file holding a single record
        input: PathBuf,
        #[command(flatten)]
        opts: OutputOpts,
    },
    /// Render every record in a JSON array, one PDF each
    Batch {
        input: PathBuf,
        #[command(flatten)]
        opts: OutputOpts,
    },
    /// Print a plain-text summary of each record
    Preview { input: PathBuf },
    /// Show which fonts would be used
    Fonts,
}

#[derive(Args)]
struct OutputOpts {
    /// Output directory (must exist)
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Layout overrides as JSON
    #[arg(long, value_name = "FILE")]
    layout: Option<PathBuf>,

    /// Start from the itemized preset (wider descriptions, totals line)
    #[arg(long)]
    itemized: bool,

    /// Item catalog used to fill empty descriptions
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Replace existing files
    #[arg(long)]
    force: bool,

    /// Open the result when done
    #[arg(long)]
    open: bool,

    /// Add a "Generated on" line to the last page
    #[arg(long)]
    stamp: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Command::Render { input, opts } => render(&input, &opts),
        Command::Batch { input, opts } => batch(&input, &opts),
        Command::Preview { input } => preview(&input),
        Command::Fonts => {
            fonts();
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        process::exit(1);
    }
}

fn layout_config(opts: &OutputOpts) -> Result<LayoutConfig, Error> {
    let mut config = match &opts.layout {
        Some(path) => LayoutConfig::load(path)?,
        None if opts.itemized => LayoutConfig::itemized(),
        None => LayoutConfig::standard(),
    };
    if opts.stamp {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        config.footer.text = Some(format!("Generated on {now}"));
    }
    Ok(config)
}

/// Entry-surface preparation: default the date, fill descriptions, validate.
fn prepare(records: &mut [DocumentRecord], catalog: Option<&Catalog>) -> Result<(), Error> {
    for (i, record) in records.iter_mut().enumerate() {
        if record.date.trim().is_empty() {
            record.date = chrono::Local::now().format("%Y/%m/%d").to_string();
        }
        if let Some(catalog) = catalog {
            catalog.fill_descriptions(record);
        }
        record.validate().map_err(|e| match e {
            Error::InvalidRecord(msg) => Error::InvalidRecord(format!("record {}: {msg}", i + 1)),
            other => other,
        })?;
    }
    Ok(())
}

fn load_prepared(input: &Path, opts: &OutputOpts) -> Result<Vec<DocumentRecord>, Error> {
    let catalog = opts.catalog.as_deref().map(Catalog::load).transpose()?;
    let mut records = load_records(input)?;
    prepare(&mut records, catalog.as_ref())?;
    Ok(records)
}

fn render(input: &Path, opts: &OutputOpts) -> Result<(), Error> {
    let records = load_prepared(input, opts)?;
    let [record] = records.as_slice() else {
        return Err(Error::InvalidRecord(format!(
            "{} holds {} records, use `batch`",
            input.display(),
            records.len()
        )));
    };

    let config = layout_config(opts)?;
    let path = write_document(
        record,
        &config,
        system_fonts(),
        &FileNaming::default(),
        &opts.output,
        opts.force,
    )?;
    println!("{}", path.display());

    if opts.open {
        open_or_warn(&path);
    }
    Ok(())
}

fn batch(input: &Path, opts: &OutputOpts) -> Result<(), Error> {
    let records = load_prepared(input, opts)?;
    let config = layout_config(opts)?;
    let naming = FileNaming::default();
    let result = BatchRunner::new(&config, system_fonts(), &naming)
        .overwrite(opts.force)
        .run(&records, &opts.output)?;

    for name in &result.succeeded {
        println!("{}", opts.output.join(name).display());
    }
    for (index, err) in &result.failed {
        eprintln!("record {index}: {err}");
    }

    if opts.open {
        open_or_warn(&opts.output);
    }
    if !result.all_succeeded() {
        eprintln!(
            "{} of {} records failed",
            result.failed.len(),
            records.len()
        );
        process::exit(1);
    }
    Ok(())
}

fn preview(input: &Path) -> Result<(), Error> {
    for record in load_records(input)? {
        println!("{}", record.preview());
    }
    Ok(())
}

fn fonts() {
    let resolver = FontResolver::system();
    for candidate in resolver.candidates() {
        let bold = candidate
            .bold
            .as_ref()
            .map(|p| format!(" (bold: {})", p.display()))
            .unwrap_or_default();
        println!("candidate: {}{bold}", candidate.regular.display());
    }
    let set = system_fonts();
    if set.available() {
        println!("body: {}", set.body_family());
        println!("bold: {}", set.bold_family());
    } else {
        println!("no system font usable, using builtin Helvetica");
    }
}

fn open_or_warn(path: &Path) {
    if let Err(e) = SystemOpener.open(path) {
        log::warn!("Could not open {}: {e}", path.display());
    }
}
