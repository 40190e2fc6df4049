//! Handlers behind the `lipsync-job` and `text2image` binaries.
//!
//! Each handler returns the process exit code; the binaries only parse
//! arguments and exit.

use std::path::Path;
use std::time::Duration;

use super::args::{LipsyncArgs, Text2ImageArgs};
use crate::cancel::CancelToken;
use crate::config::{Config, LipsyncSettings};
use crate::lipsync::{JobOutcome, JobStatus, LipsyncClient, LipsyncError};
use crate::text2image::{resolve_options, ImageClient};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// Conventional exit code after SIGINT.
pub const EXIT_CANCELLED: i32 = 130;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn current_thread_runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Run the lip-sync tool: validate inputs, submit, wait, download.
///
/// All configuration and input checks happen before any network call.
pub fn run_lipsync(args: LipsyncArgs) -> i32 {
    let config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_FAILURE;
        }
    };

    let mut settings = match LipsyncSettings::resolve(&config, |k| std::env::var(k).ok()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_FAILURE;
        }
    };
    if let Some(output) = args.output {
        settings.output = output;
    }
    if let Some(secs) = args.timeout {
        settings.poll.timeout = Some(Duration::from_secs(secs));
    }

    if !args.face_file.exists() {
        println!(
            "Error: Face file '{}' does not exist.",
            args.face_file.display()
        );
        return EXIT_FAILURE;
    }
    if !args.audio_file.exists() {
        println!(
            "Error: Audio file '{}' does not exist.",
            args.audio_file.display()
        );
        return EXIT_FAILURE;
    }

    println!("Gaimin.ai LipSync Job Submission Tool v{}", VERSION);

    let rt = match current_thread_runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create async runtime: {}", e);
            return EXIT_FAILURE;
        }
    };

    let cancel = CancelToken::new();
    if let Err(e) = cancel.install_ctrlc_handler() {
        log::warn!("Could not install Ctrl+C handler: {}", e);
    }

    let result = rt.block_on(submit_and_wait(
        &settings,
        &args.face_file,
        &args.audio_file,
        &cancel,
    ));

    match result {
        Ok(JobOutcome::Completed(_)) => {
            println!("Download complete.");
            EXIT_SUCCESS
        }
        Ok(JobOutcome::Failed { error }) => {
            if let Some(error) = error {
                println!("Reported error: {}", error);
            }
            println!("Job failed. Please check the error and try again.");
            EXIT_SUCCESS
        }
        Ok(JobOutcome::Cancelled) => {
            println!("Stopped waiting for the job.");
            EXIT_CANCELLED
        }
        Err(LipsyncError::UnsupportedFormat(ext)) => {
            println!("Error: Unsupported file format for face input: {}", ext);
            EXIT_FAILURE
        }
        Err(e @ LipsyncError::Rejected { .. }) => {
            println!("{}", e);
            EXIT_FAILURE
        }
        Err(e) => {
            println!("API Error: {}", e);
            EXIT_FAILURE
        }
    }
}

async fn submit_and_wait(
    settings: &LipsyncSettings,
    face_file: &Path,
    audio_file: &Path,
    cancel: &CancelToken,
) -> Result<JobOutcome, LipsyncError> {
    let client = LipsyncClient::with_base_url(settings.api_key.clone(), settings.base_url.clone())?;

    println!("Submitting LipSync job...");
    let job_id = tokio::select! {
        job_id = client.submit(face_file, audio_file) => job_id?,
        _ = cancel.cancelled() => {
            log::info!("Submission cancelled before the job was created");
            return Ok(JobOutcome::Cancelled);
        }
    };
    println!("Job submitted. ID: {}", job_id);

    let output = &settings.output;
    let interval = settings.poll.interval;
    client
        .wait_for_job(&job_id, output, &settings.poll, cancel, |status| {
            println!("Current status: {}", status);
            match status {
                JobStatus::Completed { .. } => {
                    println!(
                        "Job completed. Downloading result to {}...",
                        output.display()
                    );
                }
                JobStatus::Failed { .. } => {}
                JobStatus::Waiting(_) => {
                    println!("Waiting {} seconds before next check...", interval.as_secs());
                }
            }
        })
        .await
}

/// Run the text-to-image tool: one request, response printed as JSON.
pub fn run_text2image(args: Text2ImageArgs) -> i32 {
    let config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_FAILURE;
        }
    };
    let url = args.url.unwrap_or_else(|| config.text2image_url());

    let options = match resolve_options(args.options.as_deref()) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_FAILURE;
        }
    };

    println!("Gaimin.ai Text2Image Tool v{}", VERSION);

    let rt = match current_thread_runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create async runtime: {}", e);
            return EXIT_FAILURE;
        }
    };

    let result = rt.block_on(async {
        let client = ImageClient::with_url(args.api_key, url)?;
        client.generate(&args.prompt, &options).await
    });

    match result {
        Ok(response) => {
            println!("{:#}", response);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}
