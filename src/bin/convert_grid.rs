//! Grid converter binary: runs the brick pipeline on a serialized grid.
//!
//! Usage: cargo run --release --bin convert_grid -- <grid.json> [OPTIONS]
//!
//! Options:
//!   --catalog <FILE>   Brick catalog JSON (default: builtin table)
//!   --colors <A> <B>   Color catalogs, official then third-party
//!   --output <FILE>    Write result JSON here (default: stdout)
//!
//! The input file holds a JSON-serialized `VoxelGrid`; the output carries
//! the final bricks, per-layer instructions, and model metrics.

use std::path::PathBuf;
use std::process::ExitCode;

use blocky::catalog::{BrickCatalog, ColorCatalog};
use blocky::voxel::VoxelGrid;
use blocky::{Pipeline, Result};

struct Args {
    grid: PathBuf,
    catalog: Option<PathBuf>,
    colors: Option<(PathBuf, PathBuf)>,
    output: Option<PathBuf>,
}

fn parse_args() -> Option<Args> {
    let mut args = std::env::args().skip(1);
    let mut grid = None;
    let mut catalog = None;
    let mut colors = None;
    let mut output = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--catalog" => catalog = Some(PathBuf::from(args.next()?)),
            "--colors" => {
                let official = PathBuf::from(args.next()?);
                let third_party = PathBuf::from(args.next()?);
                colors = Some((official, third_party));
            }
            "--output" => output = Some(PathBuf::from(args.next()?)),
            _ if grid.is_none() => grid = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }

    Some(Args {
        grid: grid?,
        catalog,
        colors,
        output,
    })
}

fn run(args: &Args) -> Result<()> {
    let text = std::fs::read_to_string(&args.grid)?;
    let grid: VoxelGrid = serde_json::from_str(&text)?;
    log::info!(
        "loaded grid {:?} with {} filled cells",
        grid.dims(),
        grid.filled_count()
    );

    let brick_catalog = match &args.catalog {
        Some(path) => BrickCatalog::load(path)?,
        None => BrickCatalog::standard(),
    };
    let color_catalog = match &args.colors {
        Some((official, third_party)) => ColorCatalog::load_merged(official, third_party)?,
        None => ColorCatalog::empty(),
    };

    let pipeline = Pipeline::new(brick_catalog, color_catalog);
    let result = pipeline.convert(&grid)?;

    let json = serde_json::to_string_pretty(&result)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    blocky::core::logging::init();

    let Some(args) = parse_args() else {
        eprintln!("usage: convert_grid <grid.json> [--catalog FILE] [--colors A B] [--output FILE]");
        return ExitCode::FAILURE;
    };

    if let Err(err) = run(&args) {
        log::error!("conversion failed: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
