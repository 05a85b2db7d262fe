//! Triad — three-way color balance for bitmaps.
//!
//! Loads an image, plays shadow/midtone/highlight offsets through the
//! grading session, and exports the GPU-rendered result as PNG.

mod config;
mod export;
mod image_loader;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use triad_core::offsets::{Channel, OffsetState, TonalRange, control_to_percent};
use triad_gpu::{BalancePipeline, GpuContext};

use crate::config::AppConfig;
use crate::session::GradingSession;

#[derive(Parser)]
#[command(name = "triad")]
#[command(author, version, about = "Three-way color balance for bitmaps")]
#[command(long_about = "
Applies shadow/midtone/highlight color offsets to an image on the GPU
and exports the result as PNG.

Offsets are raw control values in [0, 255]; 0 means no change and 255 a
full push toward white on that channel.

Examples:
  triad photo.jpg --shadows 200,0,0            # warm the shadows
  triad photo.jpg --midtones 0,64,0 -o out/    # green midtone tint
  triad photo.jpg --grade grade.json           # replay a saved grade
")]
struct Cli {
    /// Source image (PNG, JPEG, TIFF, BMP, ...).
    input: PathBuf,

    /// Shadow offsets as raw R,G,B control values in [0, 255].
    #[arg(long, value_name = "R,G,B", value_parser = parse_triple)]
    shadows: Option<[i32; 3]>,

    /// Midtone offsets as raw R,G,B control values in [0, 255].
    #[arg(long, value_name = "R,G,B", value_parser = parse_triple)]
    midtones: Option<[i32; 3]>,

    /// Highlight offsets as raw R,G,B control values in [0, 255].
    #[arg(long, value_name = "R,G,B", value_parser = parse_triple)]
    highlights: Option<[i32; 3]>,

    /// Grade preset JSON written by --save-grade.
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["shadows", "midtones", "highlights"]
    )]
    grade: Option<PathBuf>,

    /// Write the applied grade as grade.json next to the export.
    #[arg(long)]
    save_grade: bool,

    /// Output directory for the rendered PNG (default: TRIAD_EXPORT_DIR
    /// or the current directory).
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Prefer a low-power GPU adapter.
    #[arg(long)]
    low_power: bool,

    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_triple(s: &str) -> Result<[i32; 3], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected R,G,B, got '{s}'"));
    }
    let mut triple = [0i32; 3];
    for (slot, part) in triple.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| format!("'{part}' is not an integer"))?;
    }
    Ok(triple)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::default();
    let out_dir = cli.output.clone().unwrap_or_else(|| config.export_dir.clone());
    let low_power = cli.low_power || config.low_power;

    let ctx = GpuContext::new(low_power).context("failed to acquire a GPU device")?;
    let pipeline = BalancePipeline::new(&ctx).context("failed to build the balance pipeline")?;
    let mut session = GradingSession::new(pipeline);

    session
        .load_image(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;

    if let Some(path) = &cli.grade {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read grade {}", path.display()))?;
        let grade: OffsetState = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse grade {}", path.display()))?;
        session.set_grade(grade);
        for range in TonalRange::all() {
            let offset = session.grade().offset(*range);
            println!(
                "{:<10} R {:+.3}  G {:+.3}  B {:+.3}",
                range.label(),
                offset.r,
                offset.g,
                offset.b,
            );
        }
    } else {
        for (range, triple) in [
            (TonalRange::Shadows, cli.shadows),
            (TonalRange::Midtones, cli.midtones),
            (TonalRange::Highlights, cli.highlights),
        ] {
            let Some(triple) = triple else { continue };
            // Each channel edit goes through the control surface, exactly
            // as a slider would deliver it.
            session.set_active_range(range);
            for (channel, raw) in Channel::all().iter().zip(triple) {
                session.set_channel(*channel, raw)?;
            }
            println!(
                "{:<10} R {:>5.1}%  G {:>5.1}%  B {:>5.1}%",
                range.label(),
                control_to_percent(triple[0]),
                control_to_percent(triple[1]),
                control_to_percent(triple[2]),
            );
        }
    }

    let path = session.export_png(&out_dir)?;
    println!("exported {}", path.display());

    if cli.save_grade {
        let grade_path = out_dir.join("grade.json");
        let json = serde_json::to_string_pretty(session.grade())?;
        std::fs::write(&grade_path, json)
            .with_context(|| format!("failed to write {}", grade_path.display()))?;
        println!("saved grade {}", grade_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_triple() {
        assert_eq!(parse_triple("200,0,0").unwrap(), [200, 0, 0]);
        assert_eq!(parse_triple(" 1, 2, 3 ").unwrap(), [1, 2, 3]);
        assert!(parse_triple("1,2").is_err());
        assert!(parse_triple("a,b,c").is_err());
    }
}
