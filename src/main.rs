// src/main.rs

mod association;
mod config;
mod distance;
mod error;
mod perspective;
mod pipeline;
mod polyfit;
mod report;
mod stripes;
mod tracker;
mod types;

use std::fs;
use std::io::Write;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use pipeline::{FrameInput, LaneTrackingPipeline};
use report::road_map;
use types::Config;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(frames_path) = args.next() else {
        bail!("usage: lane-tracker <frames.yaml> [config.yaml]");
    };
    let config_path = args.next().unwrap_or_else(|| "config.yaml".to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(config.logging.level.as_str())
        .init();

    info!("lane tracker starting");
    info!(
        stripes = config.tracker.stripe_count,
        history = config.tracker.history_depth,
        sense = config.tracker.sense,
        "configuration loaded from {config_path}"
    );

    let contents = fs::read_to_string(&frames_path)
        .with_context(|| format!("reading recorded detections from {frames_path}"))?;
    let frames: Vec<FrameInput> =
        serde_yaml::from_str(&contents).context("parsing recorded detections")?;
    info!(frames = frames.len(), "replaying {frames_path}");

    let mut pipeline = LaneTrackingPipeline::new(&config)?;

    let mut report_file = match &config.output.report_path {
        Some(path) => Some(
            fs::File::create(path).with_context(|| format!("creating report file {path}"))?,
        ),
        None => None,
    };

    for input in &frames {
        let frame = pipeline.process_frame(input);

        match &frame.distances {
            Some(d) => info!(
                frame = frame.frame_index,
                left = format_args!("{:.2}", d.left),
                right = format_args!("{:.2}", d.right),
                "{}",
                road_map(&frame.curves, &frame.styles)
            ),
            None => info!(
                frame = frame.frame_index,
                detected = frame.lines_detected,
                "{}",
                road_map(&frame.curves, &frame.styles)
            ),
        }
        if !frame.lines_detected {
            warn!(frame = frame.frame_index, "no lane markings this frame");
        }

        if let Some(file) = &mut report_file {
            let line = serde_json::to_string(&frame).context("serializing frame report")?;
            writeln!(file, "{line}").context("writing frame report")?;
        }
    }

    info!(frames = pipeline.frames_processed(), "replay finished");
    Ok(())
}
