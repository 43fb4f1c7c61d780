//! Encoding through an `ffmpeg` child process fed raw RGBA on stdin.

use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbaImage;

use instavid_audio::SAMPLE_RATE;
use instavid_common::error::{InstavidError, InstavidResult};
use instavid_project_model::ExportFormat;

use crate::export::export_file_name;
use crate::sink::{EncoderSink, StreamSpec};

pub const DEFAULT_VIDEO_BITRATE: u64 = 8_000_000;

pub struct FfmpegSink {
    binary: String,
    output_dir: PathBuf,
    file_name: Option<String>,
    video_bitrate: u64,
    output: Option<PathBuf>,
    audio_path: Option<PathBuf>,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_task: Option<std::thread::JoinHandle<String>>,
    frames: u64,
}

impl FfmpegSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            output_dir: output_dir.into(),
            file_name: None,
            video_bitrate: DEFAULT_VIDEO_BITRATE,
            output: None,
            audio_path: None,
            child: None,
            stdin: None,
            stderr_task: None,
            frames: 0,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_bitrate(mut self, bits_per_sec: u64) -> Self {
        self.video_bitrate = bits_per_sec;
        self
    }

    /// Fixed output file name instead of the timestamped default.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn is_available(&self) -> bool {
        command_exists(&self.binary)
    }

    /// Full argument list for a stream, given where audio was written.
    pub fn build_args(&self, spec: &StreamSpec, output: &Path, audio: Option<&Path>) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(format!("{}x{}", spec.width, spec.height));
        args.extend(["-r".to_string(), spec.fps.to_string(), "-i".to_string(), "-".to_string()]);

        if let Some(audio) = audio {
            args.extend(
                ["-f", "s16le", "-ar", &SAMPLE_RATE.to_string(), "-ac", "1", "-i"]
                    .iter()
                    .map(|s| s.to_string()),
            );
            args.push(audio.display().to_string());
            args.extend(["-map", "0:v", "-map", "1:a"].iter().map(|s| s.to_string()));
        }

        args.extend(codec_args_for_format(spec.format, self.video_bitrate, audio.is_some()));
        args.push(output.display().to_string());
        args
    }

    fn cleanup_audio(&mut self) {
        if let Some(path) = self.audio_path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

impl EncoderSink for FfmpegSink {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn begin(&mut self, spec: &StreamSpec) -> InstavidResult<()> {
        if !self.is_available() {
            return Err(InstavidError::unsupported(format!(
                "No encoder found (expected {} in PATH)",
                self.binary
            )));
        }
        std::fs::create_dir_all(&self.output_dir)?;
        let file_name = self
            .file_name
            .clone()
            .unwrap_or_else(|| export_file_name(spec.format));
        let output = self.output_dir.join(file_name);

        self.audio_path = match &spec.audio {
            Some(track) => {
                let path = output.with_extension("s16le");
                std::fs::write(&path, track.to_s16le())?;
                Some(path)
            }
            None => None,
        };

        let args = self.build_args(spec, &output, self.audio_path.as_deref());
        tracing::debug!(args = ?args, "Running ffmpeg");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| InstavidError::encode(format!("Failed to start ffmpeg: {e}")))?;

        tracing::info!(
            pid = child.id(),
            output = %output.display(),
            width = spec.width,
            height = spec.height,
            fps = spec.fps,
            audio = spec.audio.is_some(),
            "ffmpeg process started"
        );

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| InstavidError::encode("Failed to open ffmpeg stdin"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| InstavidError::encode("Failed to capture ffmpeg stderr"))?;

        // Drain stderr so ffmpeg never blocks on a full pipe.
        self.stderr_task = Some(std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        }));
        self.stdin = Some(stdin);
        self.child = Some(child);
        self.output = Some(output);
        self.frames = 0;
        Ok(())
    }

    fn push_frame(&mut self, frame: &RgbaImage) -> InstavidResult<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| InstavidError::encode("Frame pushed before begin()"))?;
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| InstavidError::encode(format!("ffmpeg stopped accepting frames: {e}")))?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> InstavidResult<PathBuf> {
        // closing stdin signals end of stream
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| InstavidError::encode("finish() called before begin()"))?;
        let status = child
            .wait()
            .map_err(|e| InstavidError::encode(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = self
            .stderr_task
            .take()
            .map(|task| {
                task.join()
                    .unwrap_or_else(|_| "<failed to join stderr reader>".to_string())
            })
            .unwrap_or_default();
        self.cleanup_audio();

        if !status.success() {
            return Err(InstavidError::encode(format!(
                "ffmpeg export failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }
        let output = self
            .output
            .take()
            .ok_or_else(|| InstavidError::encode("ffmpeg produced no output path"))?;
        tracing::info!(output = %output.display(), frames = self.frames, "ffmpeg finished");
        Ok(output)
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(task) = self.stderr_task.take() {
            let _ = task.join();
        }
        self.cleanup_audio();
        if let Some(output) = self.output.take() {
            let _ = std::fs::remove_file(&output);
            tracing::debug!(output = %output.display(), "Removed partial export");
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

/// Codec flags per container. Audio flags only when an audio input exists.
pub fn codec_args_for_format(format: ExportFormat, video_bitrate: u64, with_audio: bool) -> Vec<String> {
    let video_bitrate = format!("{}k", (video_bitrate / 1000).max(1000));
    let mut args: Vec<String> = match format {
        ExportFormat::Webm => vec![
            "-c:v".to_string(),
            "libvpx-vp9".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-b:v".to_string(),
            video_bitrate,
        ],
        ExportFormat::Mp4 => vec![
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "medium".to_string(),
            "-profile:v".to_string(),
            "high".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-b:v".to_string(),
            video_bitrate,
            "-movflags".to_string(),
            "+faststart".to_string(),
        ],
    };
    if with_audio {
        let codec = match format {
            ExportFormat::Webm => "libopus",
            ExportFormat::Mp4 => "aac",
        };
        args.extend(["-c:a".to_string(), codec.to_string(), "-b:a".to_string(), "128k".to_string()]);
    }
    args
}

pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(format: ExportFormat) -> StreamSpec {
        StreamSpec {
            width: 1080,
            height: 1920,
            fps: 30,
            total_frames: 300,
            format,
            audio: None,
        }
    }

    #[test]
    fn test_webm_codec_args() {
        let args = codec_args_for_format(ExportFormat::Webm, 8_000_000, true);
        assert!(args.windows(2).any(|w| w == ["-c:v", "libvpx-vp9"]));
        assert!(args.windows(2).any(|w| w == ["-b:v", "8000k"]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "libopus"]));
    }

    #[test]
    fn test_mp4_without_audio_has_no_audio_codec() {
        let args = codec_args_for_format(ExportFormat::Mp4, 8_000_000, false);
        assert!(args.windows(2).any(|w| w == ["-c:v", "libx264"]));
        assert!(args.contains(&"+faststart".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));
    }

    #[test]
    fn test_build_args_reads_raw_rgba_from_stdin() {
        let sink = FfmpegSink::new("/tmp/out");
        let args = sink.build_args(&spec(ExportFormat::Webm), Path::new("/tmp/out/a.webm"), None);
        assert!(args.windows(2).any(|w| w == ["-pix_fmt", "rgba"]));
        assert!(args.windows(2).any(|w| w == ["-s", "1080x1920"]));
        assert!(args.windows(2).any(|w| w == ["-i", "-"]));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out/a.webm"));
    }

    #[test]
    fn test_build_args_maps_audio_input() {
        let sink = FfmpegSink::new("/tmp/out");
        let args = sink.build_args(
            &spec(ExportFormat::Mp4),
            Path::new("/tmp/out/a.mp4"),
            Some(Path::new("/tmp/out/a.s16le")),
        );
        assert!(args.windows(2).any(|w| w == ["-f", "s16le"]));
        assert!(args.windows(2).any(|w| w == ["-ar", "48000"]));
        assert!(args.windows(2).any(|w| w == ["-map", "1:a"]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
    }

    #[test]
    fn test_missing_binary_is_unsupported() {
        let mut sink = FfmpegSink::new(std::env::temp_dir()).with_binary("instavid-no-such-encoder");
        assert!(!sink.is_available());
        let err = sink.begin(&spec(ExportFormat::Webm)).unwrap_err();
        assert!(matches!(err, InstavidError::Unsupported { .. }));
    }
}
