//! Walks directories of JPEG XL files and runs the codec over them

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use jxlcoder::{
    spawn_decode_batch, CoderConfig, DecodeJob, DecodeOptions, EncodeSettings, JxlCoder,
    JxlError, PixelFormat, ScaleMode, ToneMapper, CONTAINER_SIGNATURE,
};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "jxl-batch")]
#[command(about = "Inspect, verify and re-encode JPEG XL images", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Largest image, in pixels, that will be decoded
    #[arg(long, global = true, value_name = "PIXELS")]
    max_pixels: Option<u64>,

    /// Verbose output
    #[arg(short, long, global = true, default_value_t)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, default_value_t)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print size, animation and frame metadata
    Info {
        /// Files or directories
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },
    /// Decode every image and report failures
    Check {
        #[command(flatten)]
        decode: DecodeArgs,

        /// Files or directories
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },
    /// Decode and encode again with new settings
    Reencode {
        #[command(flatten)]
        decode: DecodeArgs,

        /// Quality (0-100)
        #[arg(long, default_value_t = 90)]
        quality: u8,

        /// Effort (0-9)
        #[arg(long, default_value_t = 7)]
        effort: u8,

        /// Store exactly
        #[arg(long, default_value_t)]
        lossless: bool,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output_dir: PathBuf,

        /// Files or directories
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },
}

#[derive(Args)]
struct DecodeArgs {
    /// Bounding box width
    #[arg(long, requires = "height", value_name = "PIXELS")]
    width: Option<u32>,

    /// Bounding box height
    #[arg(long, requires = "width", value_name = "PIXELS")]
    height: Option<u32>,

    /// How the bounding box is applied
    #[arg(long, value_enum, default_value_t = ScaleModeArg::Fit)]
    scale_mode: ScaleModeArg,

    #[arg(long, value_enum, default_value_t = FormatArg::Rgba8888)]
    format: FormatArg,

    /// Curve for HDR sources decoded to integer formats
    #[arg(long, value_enum, default_value_t = ToneMapperArg::None)]
    tone_mapper: ToneMapperArg,
}

impl DecodeArgs {
    fn options(&self) -> DecodeOptions {
        let mut options = DecodeOptions::new()
            .format(self.format.into())
            .scale_mode(self.scale_mode.into())
            .tone_mapper(self.tone_mapper.into());
        if let (Some(width), Some(height)) = (self.width, self.height) {
            options = options.bounds(width, height);
        }
        options
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ScaleModeArg {
    Fit,
    Fill,
    Resize,
}

impl From<ScaleModeArg> for ScaleMode {
    fn from(arg: ScaleModeArg) -> Self {
        match arg {
            ScaleModeArg::Fit => ScaleMode::Fit,
            ScaleModeArg::Fill => ScaleMode::Fill,
            ScaleModeArg::Resize => ScaleMode::Resize,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Rgba8888,
    Rgb8888,
    Rgb565,
    RgbaF16,
    Rgba1010102,
}

impl From<FormatArg> for PixelFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Rgba8888 => PixelFormat::Rgba8888,
            FormatArg::Rgb8888 => PixelFormat::Rgb8888,
            FormatArg::Rgb565 => PixelFormat::Rgb565,
            FormatArg::RgbaF16 => PixelFormat::RgbaF16,
            FormatArg::Rgba1010102 => PixelFormat::Rgba1010102,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ToneMapperArg {
    None,
    Logarithmic,
    Rec2408,
    Filmic,
}

impl From<ToneMapperArg> for ToneMapper {
    fn from(arg: ToneMapperArg) -> Self {
        match arg {
            ToneMapperArg::None => ToneMapper::None,
            ToneMapperArg::Logarithmic => ToneMapper::Logarithmic,
            ToneMapperArg::Rec2408 => ToneMapper::Rec2408,
            ToneMapperArg::Filmic => ToneMapper::Filmic,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let mut config = CoderConfig::default();
    if let Some(max_pixels) = cli.max_pixels {
        config.max_pixels = max_pixels;
    }
    let coder = Arc::new(JxlCoder::with_config(config));

    match &cli.command {
        Command::Info { paths } => info(&coder, &collect_inputs(&coder, paths)?),
        Command::Check { decode, paths } => {
            let failed = check(&coder, &collect_inputs(&coder, paths)?, decode.options())?;
            if failed > 0 {
                anyhow::bail!("{} images failed to decode", failed);
            }
            Ok(())
        }
        Command::Reencode {
            decode,
            quality,
            effort,
            lossless,
            output_dir,
            paths,
        } => {
            let settings = EncodeSettings::new()
                .quality(*quality)
                .effort(*effort)
                .lossless(*lossless);
            // Reject bad settings before touching any file
            settings.validate()?;
            let inputs = collect_inputs(&coder, paths)?;
            let outputs = output_paths(&inputs, output_dir)?;
            reencode(&coder, &inputs, &outputs, &decode.options(), &settings)
        }
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Error
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// A JPEG XL file found under one of the command-line paths
#[derive(Debug, Clone, PartialEq, Eq)]
struct Input {
    root: PathBuf,
    path: PathBuf,
}

impl Input {
    /// Path below the root it was found under, or the file name when the
    /// root is the file itself
    fn relative(&self) -> Result<PathBuf> {
        match self.path.strip_prefix(&self.root) {
            Ok(rel) if !rel.as_os_str().is_empty() => Ok(rel.to_path_buf()),
            _ => self
                .path
                .file_name()
                .map(PathBuf::from)
                .with_context(|| format!("Input path has no file name: {}", self.path.display())),
        }
    }

    fn read(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).with_context(|| format!("Failed to read {}", self.path.display()))
    }
}

/// Expand directories and keep files whose leading bytes sniff as JPEG XL
fn collect_inputs(coder: &JxlCoder, paths: &[PathBuf]) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();
    for root in paths {
        if !root.exists() {
            anyhow::bail!("Input does not exist: {}", root.display());
        }
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let prefix = read_prefix(entry.path())
                .with_context(|| format!("Failed to read {}", entry.path().display()))?;
            if coder.is_supported(&prefix) {
                inputs.push(Input {
                    root: root.clone(),
                    path: entry.into_path(),
                });
            } else {
                log::debug!("Skipping {}: not JPEG XL", entry.path().display());
            }
        }
    }
    log::info!("Found {} JPEG XL images", inputs.len());
    Ok(inputs)
}

/// Enough leading bytes to tell either signature apart
fn read_prefix(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut prefix = Vec::with_capacity(CONTAINER_SIGNATURE.len());
    File::open(path)?
        .take(CONTAINER_SIGNATURE.len() as u64)
        .read_to_end(&mut prefix)?;
    Ok(prefix)
}

/// Mirror each input's position below its root into `output_dir`
fn output_paths(inputs: &[Input], output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::with_capacity(inputs.len());
    let mut outputs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let out_path = output_dir.join(input.relative()?);
        if !seen.insert(out_path.clone()) {
            anyhow::bail!(
                "{} and another input both map to {}",
                input.path.display(),
                out_path.display()
            );
        }
        outputs.push(out_path);
    }
    Ok(outputs)
}

/// Skip per-item failures, stop on errors that would repeat for every item
fn skip_or_fail(path: &Path, error: JxlError) -> Result<()> {
    if error.is_recoverable() {
        log::warn!("{}: {}", path.display(), error);
        Ok(())
    } else {
        Err(error).with_context(|| format!("Failed on {}", path.display()))
    }
}

fn info(coder: &JxlCoder, inputs: &[Input]) -> Result<()> {
    for input in inputs {
        let data = input.read()?;
        let header = match coder.read_header(&data) {
            Ok(header) => header,
            Err(e) => {
                skip_or_fail(&input.path, e)?;
                continue;
            }
        };
        let frames = coder.frames(&data).map(|f| f.len()).unwrap_or(0);
        println!(
            "{}: {}x{} {:?}{} {:?} {} frame(s){}",
            input.path.display(),
            header.size.width,
            header.size.height,
            header.sample_kind,
            if header.has_alpha { " alpha" } else { "" },
            header.color_encoding,
            frames,
            if coder.is_animated(&data) { " animated" } else { "" },
        );
    }
    Ok(())
}

/// Decode every input on the worker pool; returns the failure count.
/// Files are read one window at a time so only a few are held in memory.
fn check(coder: &Arc<JxlCoder>, inputs: &[Input], options: DecodeOptions) -> Result<usize> {
    let window = rayon::current_num_threads().max(1) * 2;
    let start = Instant::now();
    let mut failed = 0;
    for (offset, chunk) in inputs.chunks(window).enumerate() {
        let base = offset * window;
        let mut jobs = Vec::with_capacity(chunk.len());
        for (i, input) in chunk.iter().enumerate() {
            match input.read() {
                Ok(data) => jobs.push(DecodeJob::new(base + i, data, options)),
                Err(e) => {
                    log::warn!("{:#}", e);
                    failed += 1;
                }
            }
        }

        for outcome in spawn_decode_batch(Arc::clone(coder), jobs) {
            let path = &inputs[outcome.id].path;
            match outcome.result {
                Ok(pixels) => {
                    log::debug!("{}: {}x{}", path.display(), pixels.width(), pixels.height())
                }
                Err(e) => {
                    skip_or_fail(path, e)?;
                    failed += 1;
                }
            }
        }
    }
    log::info!(
        "Decoded {} images in {:?}, {} failed",
        inputs.len(),
        start.elapsed(),
        failed
    );
    Ok(failed)
}

fn reencode(
    coder: &JxlCoder,
    inputs: &[Input],
    outputs: &[PathBuf],
    options: &DecodeOptions,
    settings: &EncodeSettings,
) -> Result<()> {
    let (mut before, mut after) = (0u64, 0u64);
    for (input, out_path) in inputs.iter().zip(outputs) {
        let data = input.read()?;
        let encoded = match coder
            .decode(&data, options)
            .and_then(|pixels| coder.encode(&pixels, settings))
        {
            Ok(encoded) => encoded,
            Err(e) => {
                skip_or_fail(&input.path, e)?;
                continue;
            }
        };

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(out_path, &encoded)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;

        log::debug!(
            "{} -> {}: {} -> {} bytes",
            input.path.display(),
            out_path.display(),
            data.len(),
            encoded.len()
        );
        before += data.len() as u64;
        after += encoded.len() as u64;
    }
    log::info!("Re-encoded {} bytes into {} bytes", before, after);
    Ok(())
}
