//! FFmpeg command builder for raw frame decoding.

use std::path::{Path, PathBuf};

/// Output target for raw frames written to stdout.
pub const STDOUT_PIPE: &str = "pipe:1";

/// FFmpeg log level; frame data owns stdout, diagnostics go to stderr.
const LOG_LEVEL: &str = "error";

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output target (file path or pipe)
    output: String,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl Into<String>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.into(),
            input_args: Vec::new(),
            output_args: Vec::new(),
        }
    }

    /// Decode every video frame of `input` as packed RGB24 to stdout.
    ///
    /// Auto-rotation is disabled so the frame size matches the probed
    /// stream dimensions.
    pub fn rgb24_frames(input: impl AsRef<Path>) -> Self {
        Self::new(input, STDOUT_PIPE)
            .input_args(["-nostdin", "-noautorotate"])
            .output_args(["-map", "0:v:0", "-an", "-sn"])
            .output_args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
    }

    /// Add input arguments (before -i).
    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add output arguments (after -i).
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-v".to_string(), LOG_LEVEL.to_string()];

        args.extend(self.input_args.iter().cloned());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.clone());

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb24_frames_args() {
        let args = FfmpegCommand::rgb24_frames("/tmp/in.mp4").build_args();

        assert_eq!(&args[..2], &["-v", "error"]);
        let input_pos = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input_pos + 1], "/tmp/in.mp4");
        assert!(args[..input_pos].contains(&"-noautorotate".to_string()));

        let fmt_pos = args.iter().position(|a| a == "-pix_fmt").unwrap();
        assert!(fmt_pos > input_pos);
        assert_eq!(args[fmt_pos + 1], "rgb24");
        assert_eq!(args.last().unwrap(), STDOUT_PIPE);
    }

    #[test]
    fn test_plain_command_args() {
        let args = FfmpegCommand::new("a.mp4", "b.mp4").build_args();
        assert_eq!(args, vec!["-v", "error", "-i", "a.mp4", "b.mp4"]);
    }
}
