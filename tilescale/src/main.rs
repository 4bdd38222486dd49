//! `tilescale` command-line tool
//!
//! ```text
//! tilescale <source> <destination> <long-side> <quality>
//!           [--max-tile-size N] [--halo N] [--order column-major|row-band]
//! ```

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tilescale::{ResizeJob, TileOptions, TileOrder};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "tilescale",
    version,
    about = "Resize an image with bicubic resampling in bounded memory"
)]
struct Args {
    /// Source image (JPEG, PNG or binary PNM)
    source: PathBuf,
    /// Destination image; the extension picks the format, JPEG otherwise
    destination: PathBuf,
    /// Target length of the longer side, in pixels
    long_side: u32,
    /// JPEG quality (0-100)
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: u8,
    /// Largest tile side in source pixels
    #[arg(long, default_value_t = 1000)]
    max_tile_size: u32,
    /// Extra source pixels decoded around each tile
    #[arg(long, default_value_t = 2)]
    halo: u32,
    /// Tile decode order
    #[arg(long, value_enum, default_value_t = Order::ColumnMajor)]
    order: Order,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Order {
    ColumnMajor,
    RowBand,
}

impl From<Order> for TileOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::ColumnMajor => TileOrder::ColumnMajor,
            Order::RowBand => TileOrder::RowBand,
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                e.exit();
            }
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> Result<()> {
    let start = Instant::now();

    let job = ResizeJob::open(&args.source, args.long_side)
        .with_context(|| format!("cannot open {}", args.source.display()))?;
    let (src_w, src_h) = job.src_size();
    let (dst_w, dst_h) = job.dst_size();
    println!("scaling from {} x {} to {} x {}...", src_w, src_h, dst_w, dst_h);

    let options = TileOptions::with_order(args.order.into())
        .max_tile_size(args.max_tile_size)
        .halo(args.halo);
    let report = job
        .run(&args.destination, args.quality, &options)
        .with_context(|| format!("cannot resize into {}", args.destination.display()))?;
    debug!(?report, "tile report");

    println!("Done!");
    println!("Time to execute: {} ms", start.elapsed().as_millis());
    Ok(())
}
