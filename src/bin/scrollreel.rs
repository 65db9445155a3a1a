use std::{
    path::{Path, PathBuf},
    process::{Command as Process, Stdio},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use scrollreel::{
    CpuSurface, EngineConfig, FsFrameSource, ScrollBus, ScrollEngine, ScrollProgressSource,
    SmoothWheel, SmoothWheelConfig, TickOutcome,
};

#[derive(Parser, Debug)]
#[command(name = "scrollreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose one global scroll progress value into a PNG.
    Frame(FrameArgs),
    /// Simulate a smooth scroll through the page and write periodic PNG snapshots.
    Scrub(ScrubArgs),
    /// Resize a directory of PNG frames and re-encode them as WebP.
    Convert(ConvertArgs),
    /// Split a video into numbered WebP frames with ffmpeg.
    Extract(ExtractArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Engine configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Directory frame paths are resolved against.
    #[arg(long)]
    assets: PathBuf,

    /// Global scroll progress in [0, 1].
    #[arg(long)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

#[derive(Parser, Debug)]
struct ScrubArgs {
    /// Engine configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Directory frame paths are resolved against.
    #[arg(long)]
    assets: PathBuf,

    /// Output directory for snapshots.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Simulated duration in seconds.
    #[arg(long, default_value_t = 6.0)]
    seconds: f64,

    /// Write a snapshot every N ticks.
    #[arg(long, default_value_t = 15)]
    snapshot_every: u32,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Directory of PNG frames.
    #[arg(long = "in")]
    in_dir: PathBuf,

    /// Output directory for WebP frames.
    #[arg(long)]
    out: PathBuf,

    /// Target width; height follows the aspect ratio.
    #[arg(long, default_value_t = 1920)]
    width: u32,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Source video file.
    #[arg(long)]
    video: PathBuf,

    /// Output directory for `00001.webp`, `00002.webp`, ... Existing files in it are removed.
    #[arg(long)]
    out: PathBuf,

    /// Frames sampled per second of video.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Target width; height follows the aspect ratio.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// WebP quality, 0..=100.
    #[arg(long, default_value_t = 75)]
    quality: u32,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Scrub(args) => cmd_scrub(args),
        Command::Convert(args) => cmd_convert(args),
        Command::Extract(args) => cmd_extract(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")
}

fn load_engine(config: &Path, assets: &Path) -> anyhow::Result<ScrollEngine> {
    let cfg = EngineConfig::from_path(config)?;
    let source = Arc::new(FsFrameSource::new(assets));
    Ok(ScrollEngine::new(cfg, source)?)
}

fn preload(engine: &ScrollEngine) -> anyhow::Result<()> {
    let report = runtime()?.block_on(engine.preload());
    if report.failed > 0 {
        tracing::warn!(
            failed = report.failed,
            total = report.total,
            "some frames failed to load"
        );
    }
    if report.ready == 0 {
        anyhow::bail!("no frames could be loaded");
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&args.progress) {
        anyhow::bail!("--progress must be within [0, 1]");
    }
    let engine = load_engine(&args.config, &args.assets)?;
    preload(&engine)?;

    let surface = CpuSurface::new(args.width, args.height, engine.config().background())?;
    let (surface, outcome) = engine.render_once(args.progress, surface)?;
    if outcome == TickOutcome::Idle {
        anyhow::bail!("frame for progress {} is not available", args.progress);
    }

    ensure_parent(&args.out)?;
    surface.save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_scrub(args: ScrubArgs) -> anyhow::Result<()> {
    if !args.seconds.is_finite() || args.seconds <= 0.0 {
        anyhow::bail!("--seconds must be > 0");
    }
    let engine = load_engine(&args.config, &args.assets)?;
    preload(&engine)?;

    let viewport_height = f64::from(args.height);
    let bus = ScrollBus::new(viewport_height);
    let region = engine.region_at(0.0, viewport_height)?;
    let wheel_cfg = SmoothWheelConfig::default();
    let mut wheel = SmoothWheel::new(wheel_cfg, region.document_limit())?;

    let surface = CpuSurface::new(args.width, args.height, engine.config().background())?;
    let scroll = ScrollProgressSource::new(bus.subscribe(), region, engine.config().smoothing);
    let mut compositor = engine.compositor(surface)?.with_scroll(scroll);

    let fps = engine.config().fps()?;
    let dt = fps.frame_duration_secs();
    let ticks = (args.seconds * fps.as_f64()).ceil() as u32;
    // Wheel input spread over the first two thirds, leaving time for the easing to settle.
    let input_ticks = (ticks * 2 / 3).max(1);
    let delta = region.document_limit() / (f64::from(input_ticks) * wheel_cfg.wheel_multiplier);
    let every = args.snapshot_every.max(1);

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let mut written = 0u32;
    for tick in 0..ticks {
        if tick < input_ticks {
            wheel.on_wheel(delta);
        }
        wheel.tick(dt, &bus);
        compositor.tick(dt)?;

        if tick % every == 0 || tick + 1 == ticks {
            let path = args.out.join(format!("scrub_{tick:05}.png"));
            compositor.surface().save_png(&path)?;
            written += 1;
            let state = compositor.state();
            tracing::debug!(
                tick,
                progress = state.progress,
                segment = state.segment,
                index = state.target_index,
                "snapshot"
            );
        }
    }

    eprintln!("wrote {written} snapshots to {}", args.out.display());
    Ok(())
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    if args.width == 0 {
        anyhow::bail!("--width must be > 0");
    }
    let mut files = std::fs::read_dir(&args.in_dir)
        .with_context(|| format!("read input dir '{}'", args.in_dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")))
        .collect::<Vec<_>>();
    files.sort();
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let total = files.len();
    tracing::info!(total, "converting PNG frames to WebP");
    let done = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    files.par_iter().for_each(|input| {
        if let Err(err) = convert_one(input, &args.out, args.width) {
            failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                file = %input.display(),
                error = %format!("{err:#}"),
                "convert failed"
            );
        }
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        if n % 10 == 0 || n == total {
            tracing::info!("converted {n}/{total} frames");
        }
    });

    let failed = failed.into_inner();
    if failed > 0 {
        tracing::warn!(failed, total, "conversion finished with failures");
    }
    eprintln!("converted {}/{total} frames into {}", total - failed, args.out.display());
    Ok(())
}

fn convert_one(input: &Path, out_dir: &Path, width: u32) -> anyhow::Result<()> {
    let img = image::open(input).with_context(|| format!("open '{}'", input.display()))?;
    let scale = f64::from(width) / f64::from(img.width());
    let height = ((f64::from(img.height()) * scale).round() as u32).max(1);
    let resized = if img.width() == width {
        img
    } else {
        img.resize_exact(width, height, image::imageops::FilterType::Lanczos3)
    };
    let stem = input
        .file_stem()
        .with_context(|| format!("no file name in '{}'", input.display()))?;
    let out = out_dir.join(format!("{}.webp", stem.to_string_lossy()));
    image::DynamicImage::ImageRgba8(resized.to_rgba8())
        .save_with_format(&out, image::ImageFormat::WebP)
        .with_context(|| format!("write webp '{}'", out.display()))?;
    Ok(())
}

fn is_ffmpeg_on_path() -> bool {
    Process::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Remove the files directly inside `dir`, creating it when missing.
fn reset_dir(dir: &Path) -> anyhow::Result<()> {
    if !dir.exists() {
        return std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()));
    }
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("read output dir '{}'", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("remove stale '{}'", path.display()))?;
        }
    }
    Ok(())
}

fn cmd_extract(args: ExtractArgs) -> anyhow::Result<()> {
    if args.fps == 0 || args.width == 0 {
        anyhow::bail!("--fps and --width must be > 0");
    }
    if args.quality > 100 {
        anyhow::bail!("--quality must be within [0, 100]");
    }
    if !args.video.is_file() {
        anyhow::bail!("input video '{}' not found", args.video.display());
    }
    if !is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required for frame extraction, but was not found on PATH");
    }
    reset_dir(&args.out)?;

    let pattern = args.out.join("%05d.webp");
    tracing::info!(
        video = %args.video.display(),
        out = %pattern.display(),
        fps = args.fps,
        width = args.width,
        "extracting frames"
    );
    let out = Process::new("ffmpeg")
        .args(["-v", "error", "-y", "-i"])
        .arg(&args.video)
        .args([
            "-vf",
            &format!("fps={},scale={}:-1", args.fps, args.width),
            "-c:v",
            "libwebp",
            "-q:v",
            &args.quality.to_string(),
        ])
        .arg(&pattern)
        .stdout(Stdio::null())
        .output()
        .context("failed to run ffmpeg")?;
    if !out.status.success() {
        anyhow::bail!(
            "ffmpeg frame extraction failed for '{}': {}",
            args.video.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }

    let frames = std::fs::read_dir(&args.out)
        .with_context(|| format!("read output dir '{}'", args.out.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("webp")))
        .count();
    if frames == 0 {
        anyhow::bail!("ffmpeg produced no frames from '{}'", args.video.display());
    }
    tracing::info!(frames, "frame extraction complete");
    eprintln!("extracted {frames} frames into {}", args.out.display());
    Ok(())
}
