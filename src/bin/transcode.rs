//! Command-line driver for the native transcoding engine
//!
//! Usage: transcode [OPTIONS] <INPUT> <OUTPUT>
//!        transcode --job job.json
//!
//! Built with `--features cli`.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use transcode_node::engine::NativeEngine;
use transcode_node::session::{CommonParams, Job, Session, SessionConfig, SessionResult};

#[derive(Debug, Parser)]
#[command(name = "transcode", about = "Transcode one stream of a media file")]
struct Args {
  /// Input file
  #[arg(required_unless_present = "job")]
  input: Option<String>,

  /// Output file
  #[arg(required_unless_present = "job")]
  output: Option<String>,

  /// JSON job file ({"session": {...}, "seek": 2.2, "until": 4.4}); overrides everything else
  #[arg(long, conflicts_with_all = ["input", "output"])]
  job: Option<PathBuf>,

  /// Filter chain description
  #[arg(long, default_value = "dblur")]
  filters: String,

  /// Output container format
  #[arg(long, default_value = "mp4")]
  format: String,

  /// Encoder name
  #[arg(long, default_value = "libx264")]
  encoder: String,

  /// Encoder options ("key value" pairs separated by ',')
  #[arg(
    long,
    default_value = "x264-params keyint=25:min-keyint=25:scenecut=-1,preset ultrafast"
  )]
  encoder_params: String,

  /// Pixel format of the video output
  #[arg(long, default_value = "yuv420p", conflicts_with = "audio")]
  pixel_format: String,

  /// Transcode the audio stream instead of the video stream
  #[arg(long)]
  audio: bool,

  /// Seek to this position (seconds) before processing
  #[arg(long)]
  seek: Option<f64>,

  /// Stop once the output reaches this position (seconds)
  #[arg(long)]
  until: Option<f64>,
}

impl Args {
  fn into_job(self) -> SessionResult<Job> {
    if let Some(path) = self.job {
      return Job::from_json_file(path);
    }

    let common = CommonParams {
      input: self.input.unwrap_or_default(),
      output: self.output.unwrap_or_default(),
      filters: self.filters,
      format: self.format,
      encoder: self.encoder,
      encoder_params: self.encoder_params,
    };
    let session = if self.audio {
      SessionConfig::audio(common)
    } else {
      SessionConfig::video(common, self.pixel_format)
    };

    Ok(Job {
      session,
      seek: self.seek,
      until: self.until,
    })
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let result = match Args::parse().into_job() {
    Ok(job) => Session::run(NativeEngine::shared(), &job).await,
    Err(e) => Err(e),
  };

  match result {
    Ok(report) => {
      tracing::info!(target: "transcode", outcome = ?report.outcome, steps = report.steps, "done");
      ExitCode::SUCCESS
    }
    Err(e) => {
      tracing::error!(target: "transcode", "Error occurred: {}", e);
      ExitCode::FAILURE
    }
  }
}
