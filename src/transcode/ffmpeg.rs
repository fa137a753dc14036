//! Driving an external ffmpeg binary as the transcoding engine.

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::transcode::{EncodeJob, StreamKind, Transcoder};
use crate::utils;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

/// A [`Transcoder`] backed by an external ffmpeg executable.
///
/// Fetch jobs run without a timeout and rely on the session's cancellation
/// token; muxing runs through the [`Executor`] with a bounded timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegTranscoder {
    /// The path to the ffmpeg executable.
    pub executable: PathBuf,
    /// The timeout for mux invocations.
    pub mux_timeout: Duration,
}

impl FfmpegTranscoder {
    /// Creates a transcoder with the default two-minute mux timeout.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            mux_timeout: Duration::from_secs(120),
        }
    }

    fn encode_args(job: &EncodeJob) -> Vec<String> {
        let mut args = utils::to_owned(vec!["-hide_banner", "-nostdin", "-y"]);

        if let Some(trim) = job.trim {
            args.push("-ss".to_string());
            args.push(trim.start.as_secs_f64().to_string());
            args.push("-t".to_string());
            args.push(trim.duration().as_secs_f64().to_string());
        }

        args.push("-i".to_string());
        args.push(job.source_url.clone());

        match job.kind {
            StreamKind::Video => {
                args.push("-an".to_string());
                if let Some(kbps) = job.kbps_bitrate {
                    args.push("-b:v".to_string());
                    args.push(format!("{kbps}k"));
                }
                args.push("-preset".to_string());
                args.push("ultrafast".to_string());
            }
            StreamKind::Audio => {
                args.push("-vn".to_string());
                if let Some(kbps) = job.kbps_bitrate {
                    args.push("-b:a".to_string());
                    args.push(format!("{kbps}k"));
                }
            }
        }

        args.append(&mut utils::to_owned(vec![
            "-movflags",
            "+faststart",
            "-map_metadata",
            "-1",
            "-threads",
            "0",
            "-progress",
            "pipe:1",
            "-loglevel",
            "error",
        ]));

        args.push(job.destination.display().to_string());
        args
    }
}

/// Parses an `out_time_us=`/`out_time_ms=` progress line into seconds.
///
/// ffmpeg reports both keys in microseconds.
fn parse_out_time(line: &str) -> Option<f64> {
    let micros = line
        .strip_prefix("out_time_us=")
        .or_else(|| line.strip_prefix("out_time_ms="))?;
    let micros: f64 = micros.trim().parse().ok()?;

    Some(micros / 1_000_000.0)
}

impl Transcoder for FfmpegTranscoder {
    async fn fetch_and_encode(
        &self,
        job: &EncodeJob,
        cancel: &CancellationToken,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Running ffmpeg fetch into {:?}", job.destination);

        let mut command = tokio::process::Command::new(&self.executable);
        command.args(Self::encode_args(job));
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::null());
        command.kill_on_drop(true);

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(0x08000000);
        }

        let mut child = command.spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Command("Failed to capture ffmpeg progress output".to_string()))?;

        // Without a trim window the clip length is unknown, so intermediate
        // percentages cannot be derived; only the final 100 is reported.
        let total_secs = job.trim.map(|trim| trim.duration().as_secs_f64());

        let mut lines = BufReader::new(stdout).lines();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    if let Err(_e) = child.kill().await {
                        #[cfg(feature = "tracing")]
                        tracing::error!("Failed to kill cancelled ffmpeg process: {}", _e);
                    }

                    return Err(Error::Cancelled);
                }
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if let (Some(total), Some(done)) = (total_secs, parse_out_time(&line)) {
                                if total > 0.0 {
                                    on_progress((done / total * 100.0).clamp(0.0, 100.0));
                                }
                            }
                        }
                        None => break,
                    }
                }
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(Error::Command(format!(
                "ffmpeg exited with code {}",
                status.code().unwrap_or(-1)
            )));
        }

        on_progress(100.0);
        Ok(())
    }

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Muxing {:?} and {:?} into {:?}", video, audio, output);

        let video = path_str(video)?;
        let audio = path_str(audio)?;
        let output = path_str(output)?;

        let args = vec![
            "-y", "-i", video, "-i", audio, "-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy",
            "-c:a", "aac", "-loglevel", "error", output,
        ];

        let executor = Executor {
            executable_path: self.executable.clone(),
            timeout: self.mux_timeout,
            args: utils::to_owned(args),
        };

        executor.execute().await?;
        Ok(())
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| Error::Path(format!("Path is not valid UTF-8: {path:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrimWindow;

    fn job(kind: StreamKind, trim: Option<TrimWindow>) -> EncodeJob {
        EncodeJob {
            source_url: "https://example.com/stream".to_string(),
            destination: PathBuf::from("/tmp/out.mp4"),
            kind,
            trim,
            kbps_bitrate: Some(128),
        }
    }

    #[test]
    fn audio_job_disables_video_and_sets_bitrate() {
        let args = FfmpegTranscoder::encode_args(&job(StreamKind::Audio, None));

        assert!(args.contains(&"-vn".to_string()));
        assert!(!args.contains(&"-an".to_string()));

        let position = args.iter().position(|a| a == "-b:a").unwrap();
        assert_eq!(args[position + 1], "128k");
    }

    #[test]
    fn video_job_disables_audio() {
        let args = FfmpegTranscoder::encode_args(&job(StreamKind::Video, None));

        assert!(args.contains(&"-an".to_string()));
        assert!(args.contains(&"-b:v".to_string()));
    }

    #[test]
    fn trim_window_maps_to_seek_and_duration() {
        let trim = TrimWindow::new(
            Duration::from_secs(30),
            Duration::from_secs(90),
        )
        .unwrap();
        let args = FfmpegTranscoder::encode_args(&job(StreamKind::Video, Some(trim)));

        let seek = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[seek + 1], "30");
        let duration = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[duration + 1], "60");
    }

    #[test]
    fn untrimmed_job_has_no_seek_arguments() {
        let args = FfmpegTranscoder::encode_args(&job(StreamKind::Audio, None));

        assert!(!args.contains(&"-ss".to_string()));
        assert!(!args.contains(&"-t".to_string()));
    }

    #[test]
    fn destination_is_the_last_argument() {
        let args = FfmpegTranscoder::encode_args(&job(StreamKind::Video, None));
        assert_eq!(args.last().unwrap(), "/tmp/out.mp4");
    }

    #[test]
    fn out_time_lines_parse_as_seconds() {
        assert_eq!(parse_out_time("out_time_us=1500000"), Some(1.5));
        assert_eq!(parse_out_time("out_time_ms=2000000"), Some(2.0));
        assert_eq!(parse_out_time("progress=continue"), None);
        assert_eq!(parse_out_time("out_time_us=garbage"), None);
    }
}
