use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quadfx", version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a video once and render all four variants with its audio (requires `ffmpeg`).
    Run(RunArgs),
    /// List the streams of a media file (requires `ffprobe`).
    Probe(ProbeArgs),
    /// Apply one variant to the first frame of a video and save it as a PNG.
    Preview(PreviewArgs),
    /// Print the default configuration as JSON.
    Config,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// JSON configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source video, also used as the audio donor.
    #[arg(long = "in")]
    source: Option<PathBuf>,

    /// Directory receiving `out1.mp4` .. `out4.mp4`.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Directory receiving the intermediate renders.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Seed every variant's noise for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Cancel renders still running after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Keep intermediates even when every output was produced.
    #[arg(long, default_value_t = false)]
    keep_intermediates: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Variant id (0-3).
    #[arg(long)]
    variant: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Probe(args) => cmd_probe(args).map(|()| true),
        Command::Preview(args) => cmd_preview(args).map(|()| true),
        Command::Config => cmd_config().map(|()| true),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &RunArgs) -> anyhow::Result<quadfx::PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => quadfx::PipelineConfig::from_json_file(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => quadfx::PipelineConfig::default(),
    };
    if let Some(source) = &args.source {
        config.source = source.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(dir) = &args.work_dir {
        config.work_dir = dir.clone();
    }
    if let Some(seed) = args.seed {
        config.noise = quadfx::NoiseSeed::Fixed(seed);
    }
    if args.timeout.is_some() {
        config.render_timeout_secs = args.timeout;
    }
    config.keep_intermediates |= args.keep_intermediates;
    Ok(config)
}

/// Returns whether every final output was produced.
fn cmd_run(args: RunArgs) -> anyhow::Result<bool> {
    let config = load_config(&args)?;
    let tools = quadfx::Toolchain::ffmpeg(&config);
    let report = quadfx::run_pipeline(&config, &tools)
        .with_context(|| format!("process '{}'", config.source.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for check in &report.outputs {
            let status = if check.exists { "ok" } else { "MISSING" };
            eprintln!("{status:>7}  {}  ({})", check.path.display(), check.name);
        }
        eprintln!(
            "{} frames, total {} ms (demux {} / render {} / remux {})",
            report.frames,
            report.timings.total_ms,
            report.timings.demux_ms,
            report.timings.render_ms,
            report.timings.remux_ms
        );
    }
    Ok(report.all_outputs_present())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let streams = quadfx::probe_streams(&args.in_path)
        .with_context(|| format!("probe '{}'", args.in_path.display()))?;
    for s in &streams {
        match &s.kind {
            quadfx::StreamKind::Video {
                width,
                height,
                frame_rate,
                ..
            } => println!(
                "#{} video {width}x{height} @ {}/{}",
                s.index, frame_rate.num, frame_rate.den
            ),
            quadfx::StreamKind::Audio {
                sample_rate,
                channels,
                layout,
            } => println!(
                "#{} audio {sample_rate} Hz, {channels} ch{}",
                s.index,
                layout.as_deref().map(|l| format!(" ({l})")).unwrap_or_default()
            ),
            quadfx::StreamKind::Other { codec_type } => println!("#{} {codec_type}", s.index),
        }
    }
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    if !quadfx::KNOWN_VARIANTS.contains(&args.variant) {
        anyhow::bail!(
            "unknown variant {} (expected one of {:?})",
            args.variant,
            quadfx::KNOWN_VARIANTS
        );
    }
    let store = quadfx::demux_once(&quadfx::FfmpegOpener, &args.in_path)?;
    let first = store
        .frames()
        .first()
        .with_context(|| format!("'{}' has no video frames", args.in_path.display()))?;

    let seed = args
        .seed
        .map_or(quadfx::NoiseSeed::Entropy, quadfx::NoiseSeed::Fixed);
    let mut rng = seed.rng_for(args.variant);
    let styled = quadfx::apply_variant(first, args.variant, &mut rng);

    create_parent(&args.out)?;
    styled
        .save_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&quadfx::PipelineConfig::default())?
    );
    Ok(())
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
