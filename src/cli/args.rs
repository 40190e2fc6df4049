//! CLI argument parsing with clap.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Submit a LipSync job with face (image or video) and audio files.
#[derive(Parser, Debug)]
#[command(name = "lipsync-job")]
#[command(version, disable_version_flag = true, long_about = None)]
pub struct LipsyncArgs {
    /// Path to the face image or video file
    pub face_file: PathBuf,

    /// Path to the audio file
    pub audio_file: PathBuf,

    /// Where to write the finished video
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Give up waiting for the job after this many seconds (default: wait forever)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

/// Execute Text2Image request
#[derive(Parser, Debug)]
#[command(name = "text2image")]
#[command(version, disable_version_flag = true, long_about = None)]
pub struct Text2ImageArgs {
    /// API Key for gaimin ai
    pub api_key: String,

    /// Prompt for image generation
    pub prompt: String,

    /// JSON string for options (replaces the defaults entirely)
    #[arg(long)]
    pub options: Option<String>,

    /// Override the generation endpoint URL
    #[arg(long)]
    pub url: Option<String>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}
