use clap::Parser;
use platepost::io::image_resolution;
use platepost::{
    AreaConvention, CornerLayout, DegenerateOverlap, Detection, OverlapConfig, PlateOverlay,
    PostprocessConfig, Postprocessor, Resolution, RowLayout, SuppressParams,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "platepost CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CornerLayoutConfig {
    LtLbRtRb,
    LtRtLbRb,
}

impl From<CornerLayoutConfig> for CornerLayout {
    fn from(value: CornerLayoutConfig) -> Self {
        match value {
            CornerLayoutConfig::LtLbRtRb => CornerLayout::LT_LB_RT_RB,
            CornerLayoutConfig::LtRtLbRb => CornerLayout::LT_RT_LB_RB,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum AreaConventionConfig {
    PixelInclusive,
    Continuous,
}

impl From<AreaConventionConfig> for AreaConvention {
    fn from(value: AreaConventionConfig) -> Self {
        match value {
            AreaConventionConfig::PixelInclusive => AreaConvention::PixelInclusive,
            AreaConventionConfig::Continuous => AreaConvention::Continuous,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
struct ResolutionJson {
    width: u32,
    height: u32,
}

impl From<ResolutionJson> for Resolution {
    fn from(value: ResolutionJson) -> Self {
        Resolution::new(value.width, value.height)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SuppressJson {
    confidence_threshold: f32,
    iou_threshold: f32,
    keep_confidence: bool,
    area: AreaConventionConfig,
    degenerate_overlap: f32,
}

impl Default for SuppressJson {
    fn default() -> Self {
        let cfg = SuppressParams::default();
        Self {
            confidence_threshold: cfg.confidence_threshold,
            iou_threshold: cfg.iou_threshold,
            keep_confidence: cfg.keep_confidence,
            area: AreaConventionConfig::PixelInclusive,
            degenerate_overlap: cfg.overlap.degenerate.value(),
        }
    }
}

impl SuppressJson {
    fn to_params(&self) -> Result<SuppressParams, Box<dyn std::error::Error>> {
        let degenerate = if self.degenerate_overlap == 0.0 {
            DegenerateOverlap::Zero
        } else if self.degenerate_overlap == 1.0 {
            DegenerateOverlap::One
        } else {
            return Err("suppression.degenerate_overlap must be 0 or 1".into());
        };
        Ok(SuppressParams {
            confidence_threshold: self.confidence_threshold,
            iou_threshold: self.iou_threshold,
            keep_confidence: self.keep_confidence,
            overlap: OverlapConfig {
                area: self.area.into(),
                degenerate,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    rows_path: String,
    /// Source image; its native size is the target resolution when `target`
    /// is absent.
    image_path: Option<String>,
    output_path: Option<String>,
    model: ResolutionJson,
    target: Option<ResolutionJson>,
    keypoints: usize,
    corner_layout: CornerLayoutConfig,
    display_threshold: f32,
    parallel: bool,
    suppression: SuppressJson,
}

impl Default for Config {
    fn default() -> Self {
        let cfg = PostprocessConfig::default();
        Self {
            rows_path: String::new(),
            image_path: None,
            output_path: None,
            model: ResolutionJson {
                width: cfg.model_resolution.width,
                height: cfg.model_resolution.height,
            },
            target: None,
            keypoints: cfg.layout.keypoints,
            corner_layout: CornerLayoutConfig::LtLbRtRb,
            display_threshold: cfg.display_threshold,
            parallel: cfg.parallel,
            suppression: SuppressJson::default(),
        }
    }
}

/// Detector output as stored on disk: one array per row, or the flat tensor.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowsFile {
    Nested(Vec<Vec<f32>>),
    Flat(Vec<f32>),
}

#[derive(Debug, Serialize)]
struct OverlayRecord {
    center: [i32; 2],
    markers: Vec<[i32; 2]>,
    outline: Vec<[i32; 2]>,
    /// `[left, top, right, bottom]`.
    #[serde(rename = "box")]
    bbox: [i32; 4],
    rectified_size: [f32; 2],
}

impl From<&PlateOverlay> for OverlayRecord {
    fn from(value: &PlateOverlay) -> Self {
        let px = |p| {
            let (x, y) = platepost::lowlevel::to_pixel(p);
            [x, y]
        };
        let (left, top, right, bottom) = value.box_pixels();
        let (w, h) = value.quad.rectified_size();
        Self {
            center: px(value.center),
            markers: value.markers.iter().copied().map(px).collect(),
            outline: value.outline().into_iter().map(px).collect(),
            bbox: [left, top, right, bottom],
            rectified_size: [w, h],
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    /// `[cx, cy, w, h]` in target pixels.
    bbox: [f32; 4],
    keypoints: Vec<[f32; 2]>,
    confidence: Option<f32>,
    /// Detection re-encoded in the detector's positional layout.
    row: Vec<Option<f32>>,
    overlay: Option<OverlayRecord>,
}

fn record(
    det: &Detection,
    layout: RowLayout,
    corners: CornerLayout,
) -> Result<DetectionRecord, Box<dyn std::error::Error>> {
    let c = det.bbox.center_form();
    let row = layout
        .to_row(det)?
        .into_iter()
        .map(|v| if v.is_nan() { None } else { Some(v) })
        .collect();
    let overlay = if det.keypoints.len() == 4 {
        Some(OverlayRecord::from(&PlateOverlay::from_detection(det, corners)?))
    } else {
        None
    };
    Ok(DetectionRecord {
        bbox: [c.cx, c.cy, c.w, c.h],
        keypoints: det.keypoints.iter().map(|p| [p.x, p.y]).collect(),
        confidence: det.confidence,
        row,
        overlay,
    })
}

#[derive(Debug, Serialize)]
struct Output {
    target: [u32; 2],
    detections: Vec<DetectionRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("platepost=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.rows_path.is_empty() {
        return Err("rows_path must be set in the config".into());
    }

    let target: Resolution = match (config.target, &config.image_path) {
        (Some(target), _) => target.into(),
        (None, Some(path)) => image_resolution(path)?,
        (None, None) => return Err("either target or image_path must be set".into()),
    };

    let layout = RowLayout::new(config.keypoints);
    let post = Postprocessor::new(PostprocessConfig {
        layout,
        model_resolution: config.model.into(),
        suppression: config.suppression.to_params()?,
        display_threshold: config.display_threshold,
        parallel: config.parallel,
    })?;

    let rows_text = fs::read_to_string(&config.rows_path)?;
    let detections = match serde_json::from_str::<RowsFile>(&rows_text)? {
        RowsFile::Nested(rows) => post.run_rows(&rows, target)?,
        RowsFile::Flat(data) => post.run_flat(&data, target)?,
    };
    tracing::info!(detections = detections.len(), "postprocessed");

    let corners: CornerLayout = config.corner_layout.into();
    let records = detections
        .iter()
        .map(|det| record(det, layout, corners))
        .collect::<Result<Vec<_>, _>>()?;
    let output = Output {
        target: [target.width, target.height],
        detections: records,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
