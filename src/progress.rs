//! Mapping of sub-task progress onto the session-wide percentage.

/// The slice of the overall progress range a sub-task occupies.
///
/// A two-stream session runs the video sub-task over the first half of the
/// range and the audio sub-task over the second half, so the value reported
/// to the caller is non-decreasing from 0 to 100 as long as each sub-task
/// reports monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// The sub-task spans the whole session (audio-only downloads).
    Full,
    /// The first half of a two-stream session.
    VideoHalf,
    /// The second half of a two-stream session.
    AudioHalf,
}

impl ProgressPhase {
    /// Maps a sub-task percentage to the overall session percentage.
    ///
    /// The input is clamped to `0..=100` before scaling.
    pub fn scale(self, progress: f64) -> f64 {
        let progress = progress.clamp(0.0, 100.0);

        match self {
            Self::Full => progress,
            Self::VideoHalf => progress / 2.0,
            Self::AudioHalf => progress / 2.0 + 50.0,
        }
    }
}
