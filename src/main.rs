use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::info;
use pdic_reader::export::{self, OutputEncoding, OutputFormat};
use pdic_reader::PdicReader;
use tracing_subscriber::EnvFilter;

/// Convert a PDIC Unicode dictionary (.dic) to CSV or text
#[derive(Parser, Debug)]
#[command(name = "pdic-reader", version)]
struct Args {
    /// Path to the .dic file
    input: PathBuf,

    /// Output file (defaults to the input with a .csv or .txt extension)
    output: Option<PathBuf>,

    /// Output layout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Output encoding: "unicode" (UTF-16LE with BOM), "utf8", or any WHATWG label
    #[arg(short, long, default_value = "unicode")]
    encoding: OutputEncoding,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| export::default_output_path(&args.input, args.format));

    if let Err(e) = run(&args, &output) {
        eprintln!("ERROR: Failed to convert {}", args.input.display());
        eprintln!("  {}", e);
        process::exit(1);
    }
}

fn run(args: &Args, output: &Path) -> pdic_reader::Result<()> {
    // Header and index errors surface here, before the output file exists.
    let mut reader = PdicReader::open(&args.input)?;
    let header = reader.header();
    info!(
        "Dictionary: '{}', {} words declared, {} blocks",
        header.title,
        header.nword,
        reader.num_blocks()
    );

    let out = BufWriter::new(File::create(output)?);
    let count = export::write_entries(out, reader.entries(), args.format, args.encoding)?;

    info!(
        "Wrote {} entries to {} ({:?}, {})",
        count,
        output.display(),
        args.format,
        args.encoding
    );
    Ok(())
}
