//! Low-poly CLI
//!
//! Turns images into colored triangulations and writes them as JSON.
//!
//! ## YAML parameter file
//!
//! ```yaml
//! sampler: edge-aware
//! points: 1500
//! seed: 7
//! max_size: 800
//! edge_weight: 0.8
//! color_space: lab
//! neighbors: true
//! ```
//!
//! Run with: `lowpoly -i img.jpg -o img.json --config params.yaml`
//!
//! Flags given on the command line override values from the file, including
//! `--neighbors false` over `neighbors: true`.
//!
//! Per-image summaries are logged at `info`; set `RUST_LOG` to see more or less.
//!
//! ## Batches
//!
//! Several inputs can be given at once; `-o` is then a directory and each
//! input produces `<stem>.json` inside it:
//!
//!   lowpoly -i a.jpg -i b.png -o out/ --sampler poisson --points 800
//!
//! With a single input and no `-o`, the JSON goes to stdout.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use image::imageops::FilterType;
use indicatif::{ProgressBar, ProgressStyle};

use lowpoly_core::{
    ColorSpace, GenerationParams, LowPolyGenerator, LowPolyResult, SamplerKind,
};

/// Resampling filter used when an image exceeds `--max-size`
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "lowpoly")]
#[command(about = "Generate low-poly triangulations of images", long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Input image path (repeat for a batch)
    #[arg(short, long, required = true)]
    input: Vec<PathBuf>,

    /// Output JSON file, or directory when several inputs are given
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sampling strategy: grid | poisson | edge-aware
    #[arg(long)]
    sampler: Option<SamplerKind>,

    /// Target number of sampled points
    #[arg(long)]
    points: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Largest image side after scaling
    #[arg(long)]
    max_size: Option<u32>,

    /// Edge bias for the edge-aware sampler (0..=1)
    #[arg(long)]
    edge_weight: Option<f64>,

    /// Color averaging space: rgb | lab
    #[arg(long)]
    color_space: Option<ColorSpace>,

    /// Compute triangle neighbor lists (`--neighbors` alone means true)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    neighbors: Option<bool>,

    /// YAML parameter file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resampling filter for downscaling
    #[arg(long, value_enum, default_value = "lanczos3")]
    filter: ResizeFilter,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn load_config(path: &Path) -> anyhow::Result<GenerationParams> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {:?}", path))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file: {:?}", path))
}

/// Merge parameters: CLI flags over the config file over defaults
fn resolve_params(file: Option<GenerationParams>, args: &Args) -> GenerationParams {
    let mut params = file.unwrap_or_default();
    if let Some(sampler) = args.sampler {
        params.sampler = sampler;
    }
    if let Some(points) = args.points {
        params.points = points;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if let Some(max_size) = args.max_size {
        params.max_size = max_size;
    }
    if let Some(edge_weight) = args.edge_weight {
        params.edge_weight = edge_weight;
    }
    if let Some(color_space) = args.color_space {
        params.color_space = color_space;
    }
    if let Some(neighbors) = args.neighbors {
        params.neighbors = neighbors;
    }
    params
}

/// Where the JSON for one input goes (`None` = stdout)
fn output_path(input: &Path, output: Option<&Path>, batch: bool) -> Option<PathBuf> {
    let file_name = || {
        let stem = input.file_stem().unwrap_or(input.as_os_str());
        PathBuf::from(stem).with_extension("json")
    };
    match output {
        None if batch => Some(input.with_extension("json")),
        None => None,
        Some(dir) if batch || dir.is_dir() => Some(dir.join(file_name())),
        Some(file) => Some(file.to_path_buf()),
    }
}

fn write_result(result: &LowPolyResult, dest: Option<&Path>, compact: bool) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match dest {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {:?}", path))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    if compact {
        serde_json::to_writer(&mut writer, result)?;
    } else {
        serde_json::to_writer_pretty(&mut writer, result)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,lowpoly=info"))
        .init();
    let args = Args::parse();

    let file_params = args.config.as_deref().map(load_config).transpose()?;
    let params = resolve_params(file_params, &args);
    params.validate().context("invalid generation parameters")?;

    let batch = args.input.len() > 1;
    if batch {
        if let Some(dir) = &args.output {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory {:?}", dir))?;
        }
    }

    eprintln!(
        "Sampler: {}, points: {}, seed: {}, color space: {:?}, max size: {}",
        params.sampler, params.points, params.seed, params.color_space, params.max_size
    );

    let progress = if batch {
        let bar = ProgressBar::new(args.input.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut generator = LowPolyGenerator::default().with_filter(args.filter.into());
    let start = Instant::now();
    let mut total_triangles = 0usize;

    for input in &args.input {
        progress.set_message(input.display().to_string());

        let image = image::open(input)
            .with_context(|| format!("failed to decode image: {:?}", input))?
            .to_rgba8();
        let (orig_w, orig_h) = image.dimensions();

        let source = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());

        let result = generator
            .generate(image, &source, &params)
            .with_context(|| format!("generation failed for {:?}", input))?;
        total_triangles += result.triangles.len();

        let dest = output_path(input, args.output.as_deref(), batch);
        write_result(&result, dest.as_deref(), args.compact)?;

        progress.suspend(|| {
            log::info!(
                "{}: {}x{} -> {}x{}, {} triangles{}",
                source,
                orig_w,
                orig_h,
                result.image.width,
                result.image.height,
                result.triangles.len(),
                dest.map(|p| format!(" -> {:?}", p)).unwrap_or_default()
            );
        });
        progress.inc(1);
    }

    progress.finish_and_clear();
    eprintln!(
        "Generated {} triangles for {} image{} in {:.2}s",
        total_triangles,
        args.input.len(),
        if batch { "s" } else { "" },
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
