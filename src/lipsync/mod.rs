//! Lip-sync job submission.
//!
//! A job is submitted as a multipart upload of a face (image or video) and an
//! audio track, then polled until the server reports it finished, and the
//! resulting video is downloaded.

mod client;
mod media;

pub use client::{
    JobOutcome, JobStatus, LipsyncClient, LipsyncError, PollOptions, DEFAULT_BASE_URL,
    DEFAULT_OUTPUT_FILE, DEFAULT_POLL_INTERVAL, JOBS_PATH,
};
pub use media::{audio_media, face_media, AudioMedia, FaceMedia, DEFAULT_AUDIO_CONTENT_TYPE};
