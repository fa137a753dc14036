#![doc = include_str!("../README.md")]

use crate::model::selector;
use crate::progress::ProgressPhase;
use crate::session::{DownloadSession, SessionState};
use crate::utils::file_system;
use std::fmt;
use std::path::PathBuf;

pub mod catalog;
pub mod error;
pub mod executor;
pub mod model;
pub mod progress;
pub mod transcode;
pub mod utils;

mod session;

// Re-export of the common surface to facilitate its use
pub use catalog::Catalog;
pub use error::{Error, Result};
pub use model::{
    AudioStreamInfo, DownloadRequest, SelectedStreams, StreamManifest, TrimWindow, VideoStreamInfo,
};
pub use transcode::{EncodeJob, FfmpegTranscoder, StreamKind, Transcoder};

/// The download orchestrator: one video and one audio fetch per request,
/// optionally muxed into a single container.
///
/// Collaborators are injected: a [`Catalog`] resolves a source into a
/// [`StreamManifest`], and a [`Transcoder`] fetches, encodes and muxes the
/// selected streams. At most one download session runs at a time per
/// `Downloader`; a concurrent call fails with
/// [`Error::AlreadyDownloading`](error::Error::AlreadyDownloading).
///
/// # Examples
///
/// See the crate-level documentation for a complete example.
pub struct Downloader<C, T> {
    catalog: C,
    transcoder: T,
    /// The directory holding the intermediate files of two-stream downloads.
    work_dir: PathBuf,
    session: SessionState,
}

impl<C, T> fmt::Debug for Downloader<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("work_dir", &self.work_dir)
            .field("is_downloading", &self.session.is_active())
            .finish_non_exhaustive()
    }
}

impl<C: Catalog, T: Transcoder> Downloader<C, T> {
    /// Creates a new downloader that keeps its intermediate files in the
    /// system temporary directory.
    pub fn new(catalog: C, transcoder: T) -> Self {
        Self::with_work_dir(catalog, transcoder, std::env::temp_dir())
    }

    /// Creates a new downloader with a custom directory for intermediates.
    pub fn with_work_dir(catalog: C, transcoder: T, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            transcoder,
            work_dir: work_dir.into(),
            session: SessionState::default(),
        }
    }

    /// Whether a download session is currently active.
    pub fn is_downloading(&self) -> bool {
        self.session.is_active()
    }

    /// Requests cancellation of the active session, if any.
    ///
    /// Sub-tasks observe the signal at their next progress interval and
    /// unwind through the regular failure path, so the cleanup callback still
    /// receives the partial files. Always safe to call; a no-op when idle.
    pub fn cancel_if_running(&self) {
        self.session.cancel_if_running();
    }

    /// Downloads the streams described by `request` and returns the final
    /// output path.
    ///
    /// `on_started` fires exactly once, after the manifest has been fetched
    /// and streams selected, right before the first sub-download begins.
    /// `on_progress` receives non-decreasing percentages from 0 to 100 across
    /// the whole session. On any failure after the session begins,
    /// `on_cleanup` receives every path that may have been created and should
    /// be removed; callers must treat each as "delete if present". The
    /// success of the call is `result.is_ok()`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::AlreadyDownloading`](error::Error::AlreadyDownloading)
    /// when a session is active (before `on_cleanup` is armed), and otherwise
    /// with one of `ManifestFetch`, `StreamNotFound`, `SubDownload`, `Mux` or
    /// `Cancelled`.
    pub async fn download<S, P, X>(
        &self,
        request: &DownloadRequest,
        on_started: S,
        on_progress: P,
        on_cleanup: X,
    ) -> Result<PathBuf>
    where
        S: FnOnce() + Send,
        P: Fn(f64) + Send + Sync,
        X: FnOnce(&[PathBuf]) + Send,
    {
        let mut session = self.session.begin()?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Starting download session for {}", request.url);

        let result = self
            .run_session(request, &mut session, on_started, &on_progress)
            .await;

        if let Err(ref _error) = result {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "Download session failed ({}), reporting {} file(s) for cleanup",
                _error,
                session.cleanup_files().len()
            );

            on_cleanup(session.cleanup_files());
        }

        result
    }

    async fn run_session<S>(
        &self,
        request: &DownloadRequest,
        session: &mut DownloadSession<'_>,
        on_started: S,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> Result<PathBuf>
    where
        S: FnOnce(),
    {
        let token = session.token().clone();

        let manifest = self
            .catalog
            .fetch_manifest(&request.url, &token)
            .await
            .map_err(as_manifest_error)?;

        let streams = selector::select_streams(&manifest, request)?;

        // Selection succeeded: sub-download activity begins now.
        on_started();

        match streams.video {
            None => {
                self.run_audio_only(request, &streams.audio, session, on_progress)
                    .await
            }
            Some(ref video) => {
                self.run_muxed(request, video, &streams.audio, session, on_progress)
                    .await
            }
        }
    }

    /// The single-stream path: one audio sub-task written straight to the
    /// resolved destination.
    async fn run_audio_only(
        &self,
        request: &DownloadRequest,
        audio: &AudioStreamInfo,
        session: &mut DownloadSession<'_>,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> Result<PathBuf> {
        let output = file_system::resolve_collision(&request.output, &audio.container);
        file_system::create_parent_dir(&output)?;
        session.register_cleanup(output.clone());

        let job = EncodeJob {
            source_url: audio.url.clone(),
            destination: output.clone(),
            kind: StreamKind::Audio,
            trim: request.trim,
            kbps_bitrate: Some(audio.kbps()),
        };

        let token = session.token().clone();
        let report = |progress: f64| on_progress(ProgressPhase::Full.scale(progress));
        self.transcoder
            .fetch_and_encode(&job, &token, &report)
            .await
            .map_err(as_sub_download_error)?;

        Ok(output)
    }

    /// The two-stream path: video and audio intermediates fetched
    /// sequentially, then muxed into the resolved destination.
    async fn run_muxed(
        &self,
        request: &DownloadRequest,
        video: &VideoStreamInfo,
        audio: &AudioStreamInfo,
        session: &mut DownloadSession<'_>,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> Result<PathBuf> {
        let video_temp = self.work_dir.join(format!(
            "video-{}.{}",
            file_system::random_filename(12),
            video.container
        ));
        let audio_temp = self.work_dir.join(format!(
            "audio-{}.{}",
            file_system::random_filename(12),
            audio.container
        ));
        let output = file_system::resolve_collision(&request.output, &video.container);
        file_system::create_parent_dir(&output)?;

        // Everything that may exist by the time a fault can occur. The list
        // is allowed to be over-inclusive; the caller deletes if present.
        session.register_cleanup(video_temp.clone());
        session.register_cleanup(audio_temp.clone());
        session.register_cleanup(output.clone());

        let token = session.token().clone();

        let video_job = EncodeJob {
            source_url: video.url.clone(),
            destination: video_temp.clone(),
            kind: StreamKind::Video,
            trim: request.trim,
            kbps_bitrate: Some(video.kbps()),
        };
        let video_report = |progress: f64| on_progress(ProgressPhase::VideoHalf.scale(progress));
        self.transcoder
            .fetch_and_encode(&video_job, &token, &video_report)
            .await
            .map_err(as_sub_download_error)?;

        let audio_job = EncodeJob {
            source_url: audio.url.clone(),
            destination: audio_temp.clone(),
            kind: StreamKind::Audio,
            trim: request.trim,
            kbps_bitrate: Some(audio.kbps()),
        };
        let audio_report = |progress: f64| on_progress(ProgressPhase::AudioHalf.scale(progress));
        self.transcoder
            .fetch_and_encode(&audio_job, &token, &audio_report)
            .await
            .map_err(as_sub_download_error)?;

        self.transcoder
            .mux(&video_temp, &audio_temp, &output)
            .await
            .map_err(as_mux_error)?;

        // The intermediates are no longer needed once the mux succeeded.
        file_system::remove_temp_file(&video_temp).await;
        file_system::remove_temp_file(&audio_temp).await;

        Ok(output)
    }
}

fn as_manifest_error(error: Error) -> Error {
    match error {
        Error::Cancelled | Error::ManifestFetch(_) => error,
        other => Error::ManifestFetch(other.to_string()),
    }
}

fn as_sub_download_error(error: Error) -> Error {
    match error {
        Error::Cancelled | Error::SubDownload(_) => error,
        other => Error::SubDownload(other.to_string()),
    }
}

fn as_mux_error(error: Error) -> Error {
    match error {
        Error::Cancelled | Error::Mux(_) => error,
        other => Error::Mux(other.to_string()),
    }
}
