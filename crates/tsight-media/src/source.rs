//! Video decoding seam.
//!
//! [`VideoDecoder`] opens a file into a forward-only [`VideoSource`] of
//! decoded RGB frames. [`FfmpegDecoder`] is the production implementation;
//! tests substitute in-memory sources.

use async_trait::async_trait;
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_video, VideoInfo};

/// Upper bound on FFmpeg stderr kept for error reports.
const MAX_STDERR_BYTES: usize = 4096;

/// Largest frame accepted by default (8K UHD). One RGB24 frame of this size
/// is about 100 MB.
pub const DEFAULT_MAX_PIXELS: u64 = 7680 * 4320;

/// A decoded, forward-only video stream.
#[async_trait]
pub trait VideoSource: Send {
    /// Frame rate reported by the container, if any.
    fn fps(&self) -> Option<f64>;

    /// Next decoded frame, or `None` once the stream is exhausted.
    async fn next_frame(&mut self) -> MediaResult<Option<RgbImage>>;

    /// Release the underlying stream. Must be idempotent.
    async fn close(&mut self);
}

/// Opens video files into [`VideoSource`]s.
#[async_trait]
pub trait VideoDecoder: Send + Sync {
    async fn open(&self, path: &Path) -> MediaResult<Box<dyn VideoSource>>;
}

/// Decoder that probes with FFprobe and streams RGB24 frames from FFmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    max_duration: Option<f64>,
    max_pixels: u64,
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self {
            max_duration: None,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject videos whose frames hold more than `pixels` pixels.
    pub fn with_max_pixels(mut self, pixels: u64) -> Self {
        self.max_pixels = pixels;
        self
    }

    /// Reject videos whose probed duration exceeds `seconds`.
    pub fn with_max_duration(mut self, seconds: f64) -> Self {
        self.max_duration = Some(seconds);
        self
    }

    fn check_duration(&self, info: &VideoInfo) -> MediaResult<()> {
        match self.max_duration {
            Some(max) if info.duration > max => Err(MediaError::VideoTooLong {
                duration: info.duration,
                max,
            }),
            _ => Ok(()),
        }
    }

    /// Probed dimensions size the per-frame read buffer, so they are bounded
    /// before FFmpeg is spawned.
    fn check_dimensions(&self, info: &VideoInfo) -> MediaResult<()> {
        let pixels = u64::from(info.width) * u64::from(info.height);
        if pixels > self.max_pixels {
            return Err(MediaError::InvalidVideo(format!(
                "frame size {}x{} exceeds the {} pixel limit",
                info.width, info.height, self.max_pixels
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VideoDecoder for FfmpegDecoder {
    async fn open(&self, path: &Path) -> MediaResult<Box<dyn VideoSource>> {
        let info = match probe_video(path).await {
            Ok(info) => info,
            Err(e @ (MediaError::FfprobeNotFound | MediaError::StreamOpen { .. })) => {
                return Err(e)
            }
            Err(e) => return Err(MediaError::stream_open(path, e.to_string())),
        };

        if info.width == 0 || info.height == 0 {
            return Err(MediaError::stream_open(path, "video stream has no dimensions"));
        }
        self.check_dimensions(&info)?;
        self.check_duration(&info)?;

        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let source = FfmpegSource::spawn(path, &info)?;
        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = ?info.fps,
            duration = info.duration,
            codec = %info.codec,
            "Opened video stream"
        );
        Ok(Box::new(source))
    }
}

/// Raw RGB24 frame stream read from an FFmpeg child process.
pub struct FfmpegSource {
    path: PathBuf,
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr_task: Option<JoinHandle<String>>,
    width: u32,
    height: u32,
    fps: Option<f64>,
    frames_read: u64,
    closed: bool,
}

impl FfmpegSource {
    fn spawn(path: &Path, info: &VideoInfo) -> MediaResult<Self> {
        let args = FfmpegCommand::rgb24_frames(path).build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MediaError::stream_open(path, format!("failed to spawn ffmpeg: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::stream_open(path, "ffmpeg stdout not captured"))?;

        // Drain stderr so FFmpeg never blocks on a full pipe.
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut kept = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    match stderr.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            let room = MAX_STDERR_BYTES.saturating_sub(kept.len());
                            kept.extend_from_slice(&chunk[..n.min(room)]);
                        }
                    }
                }
                String::from_utf8_lossy(&kept).trim().to_string()
            })
        });

        Ok(Self {
            path: path.to_path_buf(),
            child,
            stdout: BufReader::new(stdout),
            stderr_task,
            width: info.width,
            height: info.height,
            fps: info.fps,
            frames_read: 0,
            closed: false,
        })
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    async fn finish(&mut self) -> MediaResult<()> {
        let status = self.child.wait().await?;
        self.closed = true;
        let stderr = match self.stderr_task.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };
        self.check_exit(status, stderr)
    }

    fn check_exit(&self, status: ExitStatus, stderr: String) -> MediaResult<()> {
        if status.success() {
            return Ok(());
        }
        if self.frames_read == 0 {
            return Err(MediaError::stream_open(&self.path, stderr));
        }
        // Trailing decode errors after usable frames only truncate the stream.
        warn!(
            path = %self.path.display(),
            frames_read = self.frames_read,
            exit_code = ?status.code(),
            stderr = %stderr,
            "FFmpeg exited with errors after decoding frames"
        );
        Ok(())
    }
}

#[async_trait]
impl VideoSource for FfmpegSource {
    fn fps(&self) -> Option<f64> {
        self.fps
    }

    async fn next_frame(&mut self) -> MediaResult<Option<RgbImage>> {
        if self.closed {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.frame_len()];
        match self.stdout.read_exact(&mut buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                // End of stream; a short trailing frame is dropped.
                self.finish().await?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        self.frames_read += 1;
        RgbImage::from_raw(self.width, self.height, buf)
            .map(Some)
            .ok_or_else(|| MediaError::decode("frame buffer does not match dimensions"))
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.child.start_kill() {
            debug!(error = %e, "FFmpeg already exited");
        }
        let _ = self.child.wait().await;
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(duration: f64) -> VideoInfo {
        VideoInfo {
            duration,
            width: 4,
            height: 4,
            fps: Some(30.0),
            codec: "h264".to_string(),
        }
    }

    fn sized(width: u32, height: u32) -> VideoInfo {
        VideoInfo {
            width,
            height,
            ..info(10.0)
        }
    }

    #[test]
    fn test_max_duration() {
        let decoder = FfmpegDecoder::new().with_max_duration(300.0);
        assert!(decoder.check_duration(&info(299.9)).is_ok());
        assert!(matches!(
            decoder.check_duration(&info(301.0)),
            Err(MediaError::VideoTooLong { .. })
        ));
        assert!(FfmpegDecoder::new().check_duration(&info(10_000.0)).is_ok());
    }

    #[test]
    fn test_oversized_frames_rejected() {
        let decoder = FfmpegDecoder::new();
        assert!(decoder.check_dimensions(&sized(1920, 1080)).is_ok());
        assert!(decoder.check_dimensions(&sized(7680, 4320)).is_ok());

        let err = decoder.check_dimensions(&sized(60_000, 60_000)).unwrap_err();
        assert!(matches!(err, MediaError::InvalidVideo(_)));
        assert!(err.is_client_error());

        let small = FfmpegDecoder::new().with_max_pixels(640 * 480);
        assert!(small.check_dimensions(&sized(1280, 720)).is_err());
    }

    #[tokio::test]
    async fn test_open_missing_file_is_stream_open_error() {
        let result = FfmpegDecoder::new()
            .open(Path::new("/nonexistent/upload.mp4"))
            .await;
        match result {
            Err(MediaError::StreamOpen { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/upload.mp4"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opened a missing file"),
        }
    }
}
