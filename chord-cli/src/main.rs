//! # chord-detect - Live Chord Detection
//!
//! Command-line front end for the chord detector. It captures the default
//! input device, runs the analysis pipeline on the audio thread and prints
//! each stabilized result as it arrives.
//!
//! ## Architecture
//! - **Audio Thread**: CPAL callback running the whole analysis chain
//! - **Main Thread**: waits on the result and error channels and renders
//! - **Communication**: Crossbeam channels; only the newest result is kept

mod audio;
mod config;

use anyhow::{Context, Result, bail};
use chord_core::{ChordDetector, DetectionResult};
use clap::Parser;
use crossbeam_channel::select;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use audio::CpalSource;

/// How often the main loop wakes up to check the deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "chord-detect", about = "Detect the chord being played from the default microphone")]
struct Cli {
    /// TOML configuration file (defaults to ./chord-detect.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print one JSON object per result instead of a text line
    #[arg(long)]
    json: bool,

    /// Stop after this many seconds instead of running until interrupted
    #[arg(short, long)]
    seconds: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config = config::resolve(cli.config.as_ref())?;

    let detector = ChordDetector::new(CpalSource::new(), config.pipeline)
        .context("Invalid pipeline configuration")?;
    detector.start().context("Could not start audio capture")?;

    let results = detector.results();
    let errors = detector.errors();
    let deadline = cli.seconds.map(|s| Instant::now() + Duration::from_secs(s));

    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        select! {
            recv(results.as_receiver()) -> msg => {
                if let Ok(result) = msg {
                    println!("{}", render(&result, cli.json)?);
                }
            },
            recv(errors) -> msg => {
                let message = msg.unwrap_or_else(|_| "error channel closed".to_string());
                detector.stop();
                bail!("Audio capture failed: {}", message);
            },
            default(POLL_INTERVAL) => {},
        }
    }

    detector.stop();
    Ok(())
}

/// Formats a result as `<chord>  [<notes>]  <confidence>` or as JSON.
fn render(result: &DetectionResult, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(result)?);
    }
    Ok(format!(
        "{:<8} [{}]  {:.2}",
        result.chord_name,
        result.note_names.join(", "),
        result.confidence
    ))
}
