//! The transcoding collaborator contract and its ffmpeg-backed implementation.

use crate::error::Result;
use crate::model::TrimWindow;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

pub mod ffmpeg;

pub use ffmpeg::FfmpegTranscoder;

/// The elementary stream a fetch-and-encode job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// A video-only stream; the audio channel is dropped.
    Video,
    /// An audio-only stream; the video channel is dropped.
    Audio,
}

/// One fetch-and-encode sub-task: a single elementary stream written to a file.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeJob {
    /// The fetch locator of the elementary stream.
    pub source_url: String,
    /// The file the encoded stream is written to, extension included.
    pub destination: PathBuf,
    /// Which channel to keep.
    pub kind: StreamKind,
    /// The clip to extract; `None` fetches the entire duration.
    pub trim: Option<TrimWindow>,
    /// The target bitrate in kbps, if one is requested.
    pub kbps_bitrate: Option<u32>,
}

/// An external engine that fetches, encodes and muxes elementary streams.
///
/// The engine owns the actual decode/encode work; the library only sequences
/// jobs and aggregates their progress.
pub trait Transcoder: Send + Sync {
    /// Runs one sub-task, reporting fractional progress (0–100) at its own
    /// cadence through `on_progress`.
    ///
    /// Implementations must observe `cancel` between progress reports and
    /// unwind with [`crate::error::Error::Cancelled`]. Partial output files
    /// may be left behind; the downloader tracks and reports them for cleanup.
    fn fetch_and_encode(
        &self,
        job: &EncodeJob,
        cancel: &CancellationToken,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> impl Future<Output = Result<()>> + Send;

    /// Combines a video file and an audio file into `output`, overwriting it
    /// if present. The video stream is copied, not re-encoded.
    fn mux(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
    ) -> impl Future<Output = Result<()>> + Send;
}
