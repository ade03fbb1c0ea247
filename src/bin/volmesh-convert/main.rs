//! volmesh-convert CLI - convert volume meshes between OVM and MEDIT.
//!
//! Usage: volmesh-convert [OPTIONS] <INPUT> <OUTPUT>
//!
//! The conversion direction follows the file extensions: `.ovm` is a
//! half-face mesh, `.mesh` a flat MEDIT mesh.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use volmesh_convert::convert::{convert_file, ConvertOptions, OrientationCheck};

#[derive(Parser)]
#[command(name = "volmesh-convert")]
#[command(author, version, about = "Convert volume meshes between OVM and MEDIT", long_about = None)]
struct Cli {
    /// Input mesh file (.ovm or .mesh)
    input: PathBuf,

    /// Output mesh file (.ovm or .mesh)
    output: PathBuf,

    /// How cell orientation is checked when building half-faces
    #[arg(long, value_enum, default_value = "verify")]
    orientation: Orientation,

    /// Reject NaN or infinite vertex coordinates
    #[arg(long)]
    check_finite: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Orientation {
    /// Use cell vertex order as given
    Trust,
    /// Reject inverted or degenerate cells
    Verify,
    /// Mirror inverted cells
    Repair,
}

impl From<Orientation> for OrientationCheck {
    fn from(o: Orientation) -> Self {
        match o {
            Orientation::Trust => OrientationCheck::Trust,
            Orientation::Verify => OrientationCheck::Verify,
            Orientation::Repair => OrientationCheck::Repair,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_exit_code(&e));
        }
    };

    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Exit status for a failed parse: 1 for usage errors, 0 for `--help` and
/// `--version` (which clap also reports as errors).
fn parse_exit_code(e: &clap::Error) -> i32 {
    if e.use_stderr() {
        1
    } else {
        0
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let mut builder = env_logger::Builder::new();
    builder.target(env_logger::Target::Stderr);
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = ConvertOptions::default()
        .with_orientation(cli.orientation.into())
        .with_check_finite(cli.check_finite);

    let start = Instant::now();
    convert_file(&cli.input, &cli.output, &options)?;
    let elapsed = start.elapsed();

    println!("Saved: {} ({:.2?})", cli.output.display(), elapsed);
    Ok(())
}
