//! The models used to represent stream manifests and download requests.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod selector;

/// A time window to extract from the source media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimWindow {
    /// Offset at which the extracted clip starts.
    pub start: Duration,
    /// Offset at which the extracted clip ends.
    pub end: Duration,
}

impl TrimWindow {
    /// Creates a trim window, rejecting empty or inverted ranges.
    pub fn new(start: Duration, end: Duration) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidRequest(format!(
                "trim start ({start:?}) must be before trim end ({end:?})"
            )));
        }

        Ok(Self { start, end })
    }

    /// The length of the extracted clip.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// One download request: a source, a destination and the desired quality.
///
/// The destination is a directory plus file stem without extension; the final
/// extension always derives from the container of the selected stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// The URL or identifier of the source video.
    pub url: String,
    /// Destination path without extension.
    pub output: PathBuf,
    /// Desired video resolution height; `None` requests an audio-only download.
    pub resolution_height: Option<u32>,
    /// Desired audio bitrate in integer kbps.
    pub kbps_bitrate: u32,
    /// Clip to extract; `None` downloads the entire duration.
    pub trim: Option<TrimWindow>,
}

impl DownloadRequest {
    /// Whether the request is for the audio track alone.
    pub fn only_audio(&self) -> bool {
        self.resolution_height.is_none()
    }
}

/// A video-only stream offered by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStreamInfo {
    /// The fetch locator of the stream.
    pub url: String,
    /// The container name, used as the file extension (e.g. "mp4", "webm").
    pub container: String,
    /// The resolution height in pixels.
    pub height: u32,
    /// The resolution width in pixels.
    pub width: u32,
    /// The stream bitrate in kbps.
    pub kbps_bitrate: f64,
}

impl VideoStreamInfo {
    /// The bitrate truncated to integer kbps.
    pub fn kbps(&self) -> u32 {
        self.kbps_bitrate as u32
    }
}

/// An audio-only stream offered by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    /// The fetch locator of the stream.
    pub url: String,
    /// The container name, used as the file extension (e.g. "mp3", "m4a").
    pub container: String,
    /// The stream bitrate in kbps.
    pub kbps_bitrate: f64,
}

impl AudioStreamInfo {
    /// The bitrate truncated to integer kbps, the granularity requests match on.
    pub fn kbps(&self) -> u32 {
        self.kbps_bitrate as u32
    }
}

/// The catalog's answer for one source video: every elementary stream it offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamManifest {
    /// The available video-only streams.
    pub video_streams: Vec<VideoStreamInfo>,
    /// The available audio-only streams.
    pub audio_streams: Vec<AudioStreamInfo>,
}

impl StreamManifest {
    /// Parses a manifest from catalog JSON.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(Error::Serde)
    }
}

/// The result of stream selection for one download attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedStreams {
    /// The selected video stream, absent for audio-only downloads.
    pub video: Option<VideoStreamInfo>,
    /// The selected audio stream.
    pub audio: AudioStreamInfo,
}

impl SelectedStreams {
    /// Whether the attempt will produce an audio-only file.
    pub fn video_absent(&self) -> bool {
        self.video.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_window_rejects_inverted_range() {
        let result = TrimWindow::new(Duration::from_secs(10), Duration::from_secs(5));
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn trim_window_rejects_empty_range() {
        let result = TrimWindow::new(Duration::from_secs(5), Duration::from_secs(5));
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn trim_window_duration() {
        let window = TrimWindow::new(Duration::from_secs(30), Duration::from_secs(90)).unwrap();
        assert_eq!(window.duration(), Duration::from_secs(60));
    }

    #[test]
    fn bitrate_truncates_to_integer_kbps() {
        let stream = AudioStreamInfo {
            url: "https://example.com/a".to_string(),
            container: "mp3".to_string(),
            kbps_bitrate: 128.9,
        };
        assert_eq!(stream.kbps(), 128);
    }

    #[test]
    fn manifest_parses_from_json() {
        let raw = r#"{
            "video_streams": [
                { "url": "https://example.com/v", "container": "mp4", "height": 720, "width": 1280, "kbps_bitrate": 1500.0 }
            ],
            "audio_streams": [
                { "url": "https://example.com/a", "container": "mp3", "kbps_bitrate": 128.0 }
            ]
        }"#;

        let manifest = StreamManifest::from_json(raw).unwrap();
        assert_eq!(manifest.video_streams.len(), 1);
        assert_eq!(manifest.video_streams[0].height, 720);
        assert_eq!(manifest.audio_streams[0].kbps(), 128);
    }
}
