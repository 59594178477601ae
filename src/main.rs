use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use spritecut::cli::{CliArgs, Command, CommonArgs, CompressionLevel, InitArgs, SheetArgs};
use spritecut::config::{CompressConfig, LoadedConfig, SpriteConfig, make_relative, save_config};
use spritecut::frames::{
    FrameExtractor, FrameGrid, FramePattern, default_sheet_path, extract_frames,
};
use spritecut::output::write_frames;
use spritecut::sheet::SheetAssembler;
use spritecut::sprite::{BackgroundRemover, FrameNormalizer};

#[allow(clippy::print_stderr)]
fn main() {
    if let Err(e) = run() {
        // Use eprintln instead of error! because logger may not be initialized
        // (e.g., config loading fails before logger init)
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse();

    match &cli.command {
        Command::Process(args) => {
            let merged = merge_config_with_args(args)?;
            init_logger(merged.verbose);
            let frame_paths = run_frames(&merged)?;
            build_sheet(&merged.grid, &frame_paths, &merged.sheet, merged.compress)?;
        }
        Command::Frames(args) => {
            let merged = merge_config_with_args(args)?;
            init_logger(merged.verbose);
            run_frames(&merged)?;
        }
        Command::Sheet(args) => {
            let merged = merge_sheet_args(args)?;
            init_logger(merged.verbose);
            let frame_paths = merged
                .pattern
                .paths(&merged.frames, merged.grid.frame_count());
            build_sheet(&merged.grid, &frame_paths, &merged.output, merged.compress)?;
        }
        Command::Init(args) => {
            init_logger(false);
            run_init(args)?;
        }
    }

    info!("Done!");

    Ok(())
}

fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Extract, process and save all frames. Returns the written frame paths.
fn run_frames(merged: &MergedConfig) -> Result<Vec<PathBuf>> {
    info!("Spritecut v{}", env!("CARGO_PKG_VERSION"));

    let extractor = FrameExtractor::new(merged.target_size)
        .grid(merged.grid)
        .remover(
            BackgroundRemover::new()
                .corner_threshold(merged.corner_threshold)
                .fill_threshold(merged.fill_threshold),
        )
        .normalizer(FrameNormalizer::new(merged.target_size).crop_padding(merged.crop_padding));

    let batch = extract_frames(&merged.source, &extractor)
        .with_context(|| format!("failed to process {}", merged.source.display()))?;

    for warning in &batch.warnings {
        warn!(
            "Frame {}: skipped flood fill from corner {},{}: {}",
            warning.frame + 1,
            warning.failure.x,
            warning.failure.y,
            warning.failure.reason
        );
    }

    // Create output directory if it doesn't exist
    if !merged.output.exists() {
        fs::create_dir_all(&merged.output)?;
    }

    let paths = write_frames(&batch, &merged.output, &merged.pattern, merged.compress)?;
    info!(
        "Created {} {}x{} frames",
        paths.len(),
        merged.target_size,
        merged.target_size
    );

    Ok(paths)
}

fn build_sheet(
    grid: &FrameGrid,
    frame_paths: &[PathBuf],
    output: &Path,
    compress: Option<CompressionLevel>,
) -> Result<()> {
    if let Some(parent) = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && !p.exists())
    {
        fs::create_dir_all(parent)?;
    }

    SheetAssembler::new(*grid)
        .write_from_paths(frame_paths, output, compress)
        .context("failed to build sprite sheet")?;

    Ok(())
}

fn run_init(args: &InitArgs) -> Result<()> {
    let config_dir = args
        .path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let config = SpriteConfig {
        source: args
            .source
            .as_ref()
            .map(|source| make_relative(source, &config_dir)),
        target_size: args.size,
        ..SpriteConfig::default()
    };

    save_config(&config, &args.path, args.force)?;
    info!("Wrote {}", args.path.display());

    Ok(())
}

/// Merged configuration from CLI args and optional config file.
struct MergedConfig {
    source: PathBuf,
    output: PathBuf,
    sheet: PathBuf,
    target_size: u32,
    grid: FrameGrid,
    pattern: FramePattern,
    crop_padding: u32,
    corner_threshold: f64,
    fill_threshold: f64,
    compress: Option<CompressionLevel>,
    verbose: bool,
}

/// Sheet-only settings merged from CLI args and optional config file.
struct MergedSheetConfig {
    frames: PathBuf,
    output: PathBuf,
    grid: FrameGrid,
    pattern: FramePattern,
    compress: Option<CompressionLevel>,
    verbose: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<Option<LoadedConfig>> {
    path.map(|config_path| {
        LoadedConfig::load(config_path)
            .with_context(|| format!("failed to load config: {}", config_path.display()))
    })
    .transpose()
}

/// Merge config file values with CLI arguments.
/// CLI arguments always take precedence over config values.
fn merge_config_with_args(args: &CommonArgs) -> Result<MergedConfig> {
    let loaded_config = load_config(args.config.as_ref())?;
    let defaults = SpriteConfig::default();
    let config = loaded_config.as_ref().map(|lc| &lc.config).unwrap_or(&defaults);

    // Source: CLI > config
    let source = args
        .source
        .clone()
        .or_else(|| loaded_config.as_ref().and_then(LoadedConfig::resolve_source))
        .context("no source image given on the command line or in the config file")?;

    // Output directory: CLI > config > default
    let output = args.output.clone().unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(LoadedConfig::resolve_output_dir)
            .unwrap_or_else(|| PathBuf::from(&defaults.output_dir))
    });

    // Sheet: CLI > config > next to the output directory
    let sheet = args
        .sheet
        .clone()
        .or_else(|| loaded_config.as_ref().and_then(LoadedConfig::resolve_sheet))
        .unwrap_or_else(|| default_sheet_path(&output));

    let grid = FrameGrid::new(
        args.rows.unwrap_or(config.rows),
        args.cols.unwrap_or(config.cols),
    )?;

    let pattern = FramePattern::new(
        args.pattern
            .clone()
            .unwrap_or_else(|| config.frame_pattern.clone()),
    )?;

    let compress = if args.compress.is_some() {
        args.compress
    } else {
        config.compress.as_ref().map(compression_from_config).transpose()?
    };

    Ok(MergedConfig {
        source,
        output,
        sheet,
        target_size: args.size.unwrap_or(config.target_size),
        grid,
        pattern,
        crop_padding: args.crop_padding.unwrap_or(config.crop_padding),
        corner_threshold: args.corner_threshold.unwrap_or(config.corner_threshold),
        fill_threshold: args.fill_threshold.unwrap_or(config.fill_threshold),
        compress,
        // Verbose is CLI-only
        verbose: args.verbose,
    })
}

fn merge_sheet_args(args: &SheetArgs) -> Result<MergedSheetConfig> {
    let loaded_config = load_config(args.config.as_ref())?;
    let defaults = SpriteConfig::default();
    let config = loaded_config.as_ref().map(|lc| &lc.config).unwrap_or(&defaults);

    let frames = args.frames.clone().unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(LoadedConfig::resolve_output_dir)
            .unwrap_or_else(|| PathBuf::from(&defaults.output_dir))
    });

    let output = args
        .output
        .clone()
        .or_else(|| loaded_config.as_ref().and_then(LoadedConfig::resolve_sheet))
        .unwrap_or_else(|| default_sheet_path(&frames));

    let grid = FrameGrid::new(
        args.rows.unwrap_or(config.rows),
        args.cols.unwrap_or(config.cols),
    )?;

    let pattern = FramePattern::new(
        args.pattern
            .clone()
            .unwrap_or_else(|| config.frame_pattern.clone()),
    )?;

    let compress = if args.compress.is_some() {
        args.compress
    } else {
        config.compress.as_ref().map(compression_from_config).transpose()?
    };

    Ok(MergedSheetConfig {
        frames,
        output,
        grid,
        pattern,
        compress,
        verbose: args.verbose,
    })
}

fn compression_from_config(compress: &CompressConfig) -> Result<CompressionLevel> {
    let level: Result<CompressionLevel, String> = match compress {
        CompressConfig::Level(n) => n.to_string().parse(),
        CompressConfig::Max(s) => s.parse(),
    };
    level.map_err(|e| anyhow::anyhow!("invalid compress value in config file: {}", e))
}
