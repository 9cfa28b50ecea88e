use clap::{Parser, ValueEnum};
use log::{error, info};
use serde::Serialize;
use std::path::PathBuf;
use std::process;

use mammoscope::classification::{ClassificationResult, ModelKind, ModelRegistry};
use mammoscope::config::{self, AppConfig};
use mammoscope::debug::DebugSink;
use mammoscope::segmentation::{self, ThresholdBranch};
use mammoscope::{PipelineController, WindowSpec, imaging};

#[derive(Parser)]
#[command(name = "mammoscope")]
#[command(about = "Window, segment and classify mammographic images")]
#[command(version)]
struct Cli {
    /// Path to input image file (PNG, TIFF or JPEG)
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Lower bound of the contrast window (0-255)
    #[arg(long)]
    window_min: Option<i32>,

    /// Upper bound of the contrast window (0-255)
    #[arg(long)]
    window_max: Option<i32>,

    /// Window center, used together with --width
    #[arg(long, requires = "width", conflicts_with_all = ["window_min", "window_max"])]
    center: Option<i32>,

    /// Window width, used together with --center
    #[arg(long, requires = "center")]
    width: Option<i32>,

    /// Segment the breast region
    #[arg(long)]
    segment: bool,

    /// Classify the segmented region
    #[arg(long, value_name = "MODEL")]
    classify: Option<ModelArg>,

    /// Override the binary model path
    #[arg(long, value_name = "FILE")]
    binary_model: Option<PathBuf>,

    /// Override the multiclass model path
    #[arg(long, value_name = "FILE")]
    multiclass_model: Option<PathBuf>,

    /// Write the final displayed image here
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Save intermediate stage images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    /// Two classes: I, III
    Binary,
    /// Four classes: I, II, III, IV
    Multiclass,
}

impl From<ModelArg> for ModelKind {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Binary => ModelKind::Binary,
            ModelArg::Multiclass => ModelKind::Multiclass,
        }
    }
}

#[derive(Serialize)]
struct SegmentationSummary {
    width: u32,
    height: u32,
    gamma: f64,
    branch: ThresholdBranch,
    threshold: u8,
    area: u32,
}

#[derive(Serialize)]
struct Report {
    image: PathBuf,
    width: u32,
    height: u32,
    window: Option<WindowSpec>,
    segmentation: Option<SegmentationSummary>,
    classification: Option<ClassificationResult>,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut app_config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(path) = &cli.binary_model {
        app_config.binary_model.path = path.clone();
    }
    if let Some(path) = &cli.multiclass_model {
        app_config.multiclass_model.path = path.clone();
    }

    // Models are only worth loading when a classification was asked for
    let models = if cli.classify.is_some() {
        ModelRegistry::load(&app_config.binary_model, &app_config.multiclass_model)
    } else {
        ModelRegistry::empty()
    };

    let mut controller = PipelineController::new(models)
        .with_segmentation(app_config.segmentation)
        .with_window(app_config.window);

    let mut debug = match &cli.debug_out {
        Some(dir) => Some(DebugSink::new(dir.clone())?),
        None => None,
    };

    controller.open_image(&cli.image_path)?;
    let (width, height) = controller
        .original()
        .map(|img| img.dimensions())
        .unwrap_or_default();

    if let (Some(sink), Some(img)) = (debug.as_mut(), controller.original()) {
        sink.save("input", img)?;
    }

    let mut window = None;
    if let (Some(center), Some(w)) = (cli.center, cli.width) {
        controller.apply_window(WindowSpec::from_center_width(center, w));
        window = Some(controller.window());
    } else if cli.window_min.is_some() || cli.window_max.is_some() {
        if let Some(v) = cli.window_min {
            controller.set_window_min(v);
        }
        if let Some(v) = cli.window_max {
            controller.set_window_max(v);
        }
        controller.apply_windowing();
        window = Some(controller.window());
    }
    if let Some(spec) = window {
        info!("Applied window min={} max={}", spec.min(), spec.max());
        if let (Some(sink), Some(img)) = (debug.as_mut(), controller.displayed()) {
            sink.save("windowed", img)?;
        }
    }

    let mut summary = None;
    if cli.segment || cli.classify.is_some() {
        if let (Some(sink), Some(img)) = (debug.as_mut(), controller.displayed()) {
            let (_, trace) = segmentation::segment_with_trace(img, &app_config.segmentation)?;
            for (stage, stage_img) in trace.stages() {
                sink.save(stage, &stage_img)?;
            }
        }

        if let Some(result) = controller.apply_segmentation()? {
            summary = Some(SegmentationSummary {
                width: result.image.width(),
                height: result.image.height(),
                gamma: result.gamma,
                branch: result.branch,
                threshold: result.threshold,
                area: result.area,
            });
        }

        if let (Some(sink), Some(img)) = (debug.as_mut(), controller.displayed()) {
            sink.save("segmented", img)?;
        }
    }

    let mut classification = None;
    if let Some(kind) = cli.classify {
        classification = controller.apply_classification(kind.into())?.cloned();
    }

    if let (Some(path), Some(img)) = (&cli.output, controller.displayed()) {
        imaging::save(img, path)?;
        info!("Saved {}", path.display());
    }

    let report = Report {
        image: cli.image_path.clone(),
        width,
        height,
        window,
        segmentation: summary,
        classification,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &Report) {
    println!("Image: {} ({}x{})", report.image.display(), report.width, report.height);
    if let Some(window) = &report.window {
        println!("Window: min={} max={}", window.min(), window.max());
    }
    if let Some(seg) = &report.segmentation {
        println!(
            "Segmentation: {}x{} region, area {} px (gamma {:.3}, {:?} threshold {})",
            seg.width, seg.height, seg.area, seg.gamma, seg.branch, seg.threshold
        );
    }
    if let Some(result) = &report.classification {
        println!("Classification: {}", result);
    }
}
