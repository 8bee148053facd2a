use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::{DynamicImage, ImageReader};
use serde::Deserialize;
use sheet_packer_core::config::{
    GuillotineChoice, GuillotineSplit, MaxRectsHeuristic, PackerMethod, SizingMode,
    SkylineHeuristic,
};
use sheet_packer_core::{CancelToken, PackerConfig, Sprite, pack_sprites, pack_sprites_with_cancel};
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "sheet-packer",
    about = "Pack sprites into a single texture atlas",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack sprites into an atlas (writes name.png + name.json)
    Pack(PackArgs),
    /// Time every packing method on the same input and print occupancy
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Atlas base name (files will be name.png/.json)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (keys override the command-line options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Canvas
    /// Sizing mode: automatic | minmax | manual
    #[arg(long, default_value = "automatic", help_heading = "Canvas")]
    sizing: String,
    /// Max width (manual: exact width)
    #[arg(long, default_value_t = 2048, help_heading = "Canvas")]
    max_width: u32,
    /// Max height (manual: exact height)
    #[arg(long, default_value_t = 2048, help_heading = "Canvas")]
    max_height: u32,
    /// Min width (minmax)
    #[arg(long, default_value_t = 0, help_heading = "Canvas")]
    min_width: u32,
    /// Min height (minmax)
    #[arg(long, default_value_t = 0, help_heading = "Canvas")]
    min_height: u32,
    /// Power-of-two canvas sides
    #[arg(long, default_value_t = false, help_heading = "Canvas")]
    pow2: bool,
    /// Force a square canvas
    #[arg(long, default_value_t = false, help_heading = "Canvas")]
    square: bool,
    /// Canvas fill as #RRGGBB or #RRGGBBAA (transparent when unset)
    #[arg(long, help_heading = "Canvas")]
    background: Option<String>,

    // Sprite Processing
    /// Allow 90° rotation
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Sprite Processing")]
    allow_rotation: bool,
    /// Store mirrored duplicates once
    #[arg(long, default_value_t = false, help_heading = "Sprite Processing")]
    allow_flip: bool,
    /// Store identical sprites once
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Sprite Processing")]
    dedupe: bool,
    /// Trim transparent borders
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Sprite Processing")]
    trim: bool,
    /// Alpha threshold for trimming, in percent (0..=100)
    #[arg(long, default_value_t = 0, help_heading = "Sprite Processing")]
    alpha_threshold: u8,
    /// Gutter between sprites
    #[arg(long, default_value_t = 2, help_heading = "Sprite Processing")]
    padding: u32,
    /// Gutter around the canvas
    #[arg(long, default_value_t = 0, help_heading = "Sprite Processing")]
    border_padding: u32,
    /// Extrude pixels around each sprite
    #[arg(long, default_value_t = 0, help_heading = "Sprite Processing")]
    extrude: u32,
    /// Draw red outlines (debug)
    #[arg(long, default_value_t = false, help_heading = "Sprite Processing")]
    outlines: bool,

    // Algorithms/Heuristics
    /// Method: maxrects | guillotine | shelf | shelf_ffdh | skyline | simple_row | auto
    #[arg(long, default_value = "maxrects", help_heading = "Algorithms")]
    method: String,
    /// MaxRects heuristic: bssf|blsf|baf|bl|cp|auto
    #[arg(long, default_value = "bssf", help_heading = "Heuristics")]
    heuristic: String,
    /// Skyline heuristic: bl|minwaste
    #[arg(long, default_value = "bl", help_heading = "Heuristics")]
    skyline: String,
    /// Guillotine choice: baf|bssf|blsf|waf|wssf|wlsf
    #[arg(long, default_value = "baf", help_heading = "Heuristics")]
    g_choice: String,
    /// Guillotine split: slas|llas|minas|maxas|sas|las
    #[arg(long, default_value = "slas", help_heading = "Heuristics")]
    g_split: String,
    /// Evaluate auto trials in parallel (requires feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Algorithms")]
    parallel: bool,
    /// Cancel packing after this many milliseconds
    #[arg(long, help_heading = "Algorithms")]
    time_limit_ms: Option<u64>,

    // Export
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Input directory
    input: PathBuf,
    /// Max width
    #[arg(long, default_value_t = 4096)]
    max_width: u32,
    /// Max height
    #[arg(long, default_value_t = 4096)]
    max_height: u32,
    /// Evaluate auto trials in parallel (requires feature `parallel`)
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Bench(b) => run_bench(b, cli.progress && !cli.quiet),
    }
}

fn parse_opt<T: FromStr<Err = ()>>(what: &str, s: &str) -> anyhow::Result<T> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown {}: {}", what, s))
}

fn parse_color(s: &str) -> anyhow::Result<[u8; 4]> {
    let hex = s.trim_start_matches('#');
    let byte = |i: usize| -> anyhow::Result<u8> {
        let part = hex
            .get(i..i + 2)
            .with_context(|| format!("color {} is too short", s))?;
        u8::from_str_radix(part, 16).with_context(|| format!("invalid color {}", s))
    };
    match hex.len() {
        6 => Ok([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Ok([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => anyhow::bail!("color must be #RRGGBB or #RRGGBBAA, got {}", s),
    }
}

fn build_config(cli: &PackArgs) -> anyhow::Result<PackerConfig> {
    let cfg = PackerConfig {
        method: parse_opt::<PackerMethod>("method", &cli.method)?,
        mr_heuristic: parse_opt::<MaxRectsHeuristic>("maxrects heuristic", &cli.heuristic)?,
        skyline_heuristic: parse_opt::<SkylineHeuristic>("skyline heuristic", &cli.skyline)?,
        g_choice: parse_opt::<GuillotineChoice>("guillotine choice", &cli.g_choice)?,
        g_split: parse_opt::<GuillotineSplit>("guillotine split", &cli.g_split)?,
        sizing: parse_opt::<SizingMode>("sizing mode", &cli.sizing)?,
        max_width: cli.max_width,
        max_height: cli.max_height,
        min_width: cli.min_width,
        min_height: cli.min_height,
        power_of_two: cli.pow2,
        square: cli.square,
        padding: cli.padding,
        border_padding: cli.border_padding,
        extrude: cli.extrude,
        allow_rotation: cli.allow_rotation,
        allow_flip: cli.allow_flip,
        dedupe: cli.dedupe,
        trim: cli.trim,
        alpha_threshold: cli.alpha_threshold,
        outlines: cli.outlines,
        background_color: cli.background.as_deref().map(parse_color).transpose()?,
        parallel: cli.parallel,
    };

    // Config file keys override command-line options
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        return y.into_packer_config(cfg);
    }
    Ok(cfg)
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }
    cfg.validate().context("invalid configuration")?;

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    let sprites = load_sprites_with_progress(&paths, show_progress)?;
    info!(count = sprites.len(), "loaded input sprites");

    let cancel = CancelToken::new();
    if let Some(ms) = cli.time_limit_ms {
        let watchdog = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(ms));
            watchdog.cancel();
        });
    }

    let start = Instant::now();
    let out = match pack_sprites_with_cancel(sprites, cfg, &cancel) {
        Ok(out) => out,
        Err(e) if e.is_cancelled() => {
            warn!(elapsed = %fmt_dur(start.elapsed()), "time limit reached");
            anyhow::bail!("packing cancelled: time limit reached");
        }
        Err(e) => return Err(e).context("packing failed"),
    };
    let stats = out.stats();
    info!(elapsed = %fmt_dur(start.elapsed()), "{}", stats.summary());

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
        let png_path = cli.out_dir.join(format!("{}.png", cli.name));
        out.rgba
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        let json_path = cli.out_dir.join(format!("{}.json", cli.name));
        let json = serde_json::to_string_pretty(&out.atlas)?;
        fs::write(&json_path, json).with_context(|| format!("write {}", json_path.display()))?;
        info!(?png_path, ?json_path, "atlas written");
    }

    if let Some(stats_path) = &cli.export_stats {
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!(
                "size={}x{} used_area={} canvas_area={} occupancy={:.2}%",
                stats.width,
                stats.height,
                stats.used_area,
                stats.canvas_area,
                stats.occupancy * 100.0
            );
        }
    }
    Ok(())
}

fn run_bench(b: &BenchArgs, show_progress: bool) -> anyhow::Result<()> {
    let paths = gather_paths(&b.input, &[], &[])?;
    let sprites = load_sprites_with_progress(&paths, show_progress)?;
    let methods = [
        PackerMethod::MaxRects,
        PackerMethod::Guillotine,
        PackerMethod::Shelf,
        PackerMethod::ShelfFfdh,
        PackerMethod::Skyline,
        PackerMethod::SimpleRow,
        PackerMethod::Auto,
    ];
    for method in methods {
        let cfg = PackerConfig {
            method,
            max_width: b.max_width,
            max_height: b.max_height,
            parallel: b.parallel,
            ..Default::default()
        };
        let start = Instant::now();
        match pack_sprites(sprites.clone(), cfg) {
            Ok(out) => {
                let dur = start.elapsed();
                let stats = out.stats();
                println!(
                    "{:<12} size={}x{} occupancy={:.2}% strategy={} time={}",
                    format!("{:?}", method),
                    stats.width,
                    stats.height,
                    stats.occupancy * 100.0,
                    out.atlas.meta.method,
                    fmt_dur(dur)
                );
            }
            Err(e) => println!("{:<12} failed: {}", format!("{:?}", method), e),
        }
    }
    Ok(())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("invalid glob {}", pat))?);
    }
    Ok(Some(b.build()?))
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if exclude.is_some_and(|ex| ex.is_match(&s)) {
        return true;
    }
    include.is_some_and(|inc| !inc.is_match(&s))
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

fn load_sprites_with_progress(paths: &[PathBuf], progress: bool) -> anyhow::Result<Vec<Sprite>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_image(p) {
            Ok(img) => {
                let key = p.to_string_lossy().replace('\\', "/");
                list.push(Sprite::from_dynamic(key, img));
            }
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    method: Option<String>,
    heuristic: Option<String>,
    skyline: Option<String>,
    g_choice: Option<String>,
    g_split: Option<String>,
    sizing: Option<String>,
    max_width: Option<u32>,
    max_height: Option<u32>,
    min_width: Option<u32>,
    min_height: Option<u32>,
    power_of_two: Option<bool>,
    square: Option<bool>,
    padding: Option<u32>,
    border_padding: Option<u32>,
    extrude: Option<u32>,
    allow_rotation: Option<bool>,
    allow_flip: Option<bool>,
    dedupe: Option<bool>,
    trim: Option<bool>,
    alpha_threshold: Option<u8>,
    outlines: Option<bool>,
    background_color: Option<String>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
        if let Some(v) = self.method {
            cfg.method = parse_opt("method", &v)?;
        }
        if let Some(v) = self.heuristic {
            cfg.mr_heuristic = parse_opt("maxrects heuristic", &v)?;
        }
        if let Some(v) = self.skyline {
            cfg.skyline_heuristic = parse_opt("skyline heuristic", &v)?;
        }
        if let Some(v) = self.g_choice {
            cfg.g_choice = parse_opt("guillotine choice", &v)?;
        }
        if let Some(v) = self.g_split {
            cfg.g_split = parse_opt("guillotine split", &v)?;
        }
        if let Some(v) = self.sizing {
            cfg.sizing = parse_opt("sizing mode", &v)?;
        }
        if let Some(v) = self.max_width {
            cfg.max_width = v;
        }
        if let Some(v) = self.max_height {
            cfg.max_height = v;
        }
        if let Some(v) = self.min_width {
            cfg.min_width = v;
        }
        if let Some(v) = self.min_height {
            cfg.min_height = v;
        }
        if let Some(v) = self.power_of_two {
            cfg.power_of_two = v;
        }
        if let Some(v) = self.square {
            cfg.square = v;
        }
        if let Some(v) = self.padding {
            cfg.padding = v;
        }
        if let Some(v) = self.border_padding {
            cfg.border_padding = v;
        }
        if let Some(v) = self.extrude {
            cfg.extrude = v;
        }
        if let Some(v) = self.allow_rotation {
            cfg.allow_rotation = v;
        }
        if let Some(v) = self.allow_flip {
            cfg.allow_flip = v;
        }
        if let Some(v) = self.dedupe {
            cfg.dedupe = v;
        }
        if let Some(v) = self.trim {
            cfg.trim = v;
        }
        if let Some(v) = self.alpha_threshold {
            cfg.alpha_threshold = v;
        }
        if let Some(v) = self.outlines {
            cfg.outlines = v;
        }
        if let Some(v) = self.background_color {
            cfg.background_color = Some(parse_color(&v)?);
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
