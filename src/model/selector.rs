//! Pure selection of streams from a manifest.

use crate::error::{Error, Result};
use crate::model::{DownloadRequest, SelectedStreams, StreamManifest};

/// Picks exactly one audio stream and, unless the request is audio-only, one
/// video stream matching the requested quality.
///
/// Video streams are matched on exact resolution height, audio streams on
/// bitrate truncated to integer kbps. The manifest is usually populated from
/// the same enumeration the request qualities were picked from, but a missing
/// match still surfaces as [`Error::StreamNotFound`] rather than a panic.
pub fn select_streams(
    manifest: &StreamManifest,
    request: &DownloadRequest,
) -> Result<SelectedStreams> {
    let video = match request.resolution_height {
        None => None,
        Some(height) => Some(
            manifest
                .video_streams
                .iter()
                .find(|stream| stream.height == height)
                .cloned()
                .ok_or_else(|| {
                    Error::StreamNotFound(format!("no video-only stream with height {height}"))
                })?,
        ),
    };

    let audio = manifest
        .audio_streams
        .iter()
        .find(|stream| stream.kbps() == request.kbps_bitrate)
        .cloned()
        .ok_or_else(|| {
            Error::StreamNotFound(format!(
                "no audio-only stream at {} kbps",
                request.kbps_bitrate
            ))
        })?;

    Ok(SelectedStreams { video, audio })
}

/// Lists the distinct video resolution heights a manifest offers, descending.
pub fn video_resolutions(manifest: &StreamManifest) -> Vec<u32> {
    let mut heights: Vec<u32> = manifest
        .video_streams
        .iter()
        .map(|stream| stream.height)
        .collect();

    heights.sort_unstable_by(|a, b| b.cmp(a));
    heights.dedup();
    heights
}

/// Lists the distinct audio bitrates a manifest offers, in integer kbps, descending.
pub fn audio_bitrates(manifest: &StreamManifest) -> Vec<u32> {
    let mut bitrates: Vec<u32> = manifest
        .audio_streams
        .iter()
        .map(|stream| stream.kbps())
        .collect();

    bitrates.sort_unstable_by(|a, b| b.cmp(a));
    bitrates.dedup();
    bitrates
}
