//! Destinations for exported frames.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use instavid_audio::AudioTrack;
use instavid_common::error::{InstavidError, InstavidResult};
use instavid_project_model::ExportFormat;

/// Stream parameters announced before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSpec {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub total_frames: u64,
    pub format: ExportFormat,
    /// Mono track covering the timeline, when audio is included.
    pub audio: Option<AudioTrack>,
}

/// Consumes frames in order and produces one artifact.
pub trait EncoderSink: Send {
    fn name(&self) -> &str;

    fn begin(&mut self, spec: &StreamSpec) -> InstavidResult<()>;

    fn push_frame(&mut self, frame: &RgbaImage) -> InstavidResult<()>;

    /// Flush and return the artifact path.
    fn finish(&mut self) -> InstavidResult<PathBuf>;

    /// Give up after a failure, discarding partial output.
    fn abort(&mut self) {}
}

fn check_frame(spec: Option<&StreamSpec>, frame: &RgbaImage) -> InstavidResult<()> {
    let spec = spec.ok_or_else(|| InstavidError::encode("Frame pushed before begin()"))?;
    if frame.dimensions() != (spec.width, spec.height) {
        return Err(InstavidError::encode(format!(
            "Frame is {}x{}, stream is {}x{}",
            frame.width(),
            frame.height(),
            spec.width,
            spec.height
        )));
    }
    Ok(())
}

/// Writes `frame_00000.png`, `frame_00001.png`, ... into a directory, plus
/// `audio.wav` when the stream has audio.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    spec: Option<StreamSpec>,
    written: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            spec: None,
            written: 0,
        }
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:05}.png"))
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl EncoderSink for PngSequenceSink {
    fn name(&self) -> &str {
        "png-sequence"
    }

    fn begin(&mut self, spec: &StreamSpec) -> InstavidResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        if let Some(track) = &spec.audio {
            track.write_wav(&self.dir.join("audio.wav"))?;
        }
        self.spec = Some(spec.clone());
        self.written = 0;
        tracing::debug!(dir = %self.dir.display(), frames = spec.total_frames, "Writing PNG sequence");
        Ok(())
    }

    fn push_frame(&mut self, frame: &RgbaImage) -> InstavidResult<()> {
        check_frame(self.spec.as_ref(), frame)?;
        let path = self.frame_path(self.written);
        frame
            .save(&path)
            .map_err(|e| InstavidError::encode(format!("Failed to write {}: {e}", path.display())))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> InstavidResult<PathBuf> {
        tracing::info!(dir = %self.dir.display(), frames = self.written, "PNG sequence complete");
        Ok(self.dir.clone())
    }

    fn abort(&mut self) {
        for index in 0..self.written {
            let _ = std::fs::remove_file(self.frame_path(index));
        }
        let _ = std::fs::remove_file(self.dir.join("audio.wav"));
        self.written = 0;
    }
}

/// Keeps frames in memory. Can be told to fail at a given frame.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub spec: Option<StreamSpec>,
    pub frames: Vec<RgbaImage>,
    pub aborted: bool,
    fail_at: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose `push_frame` errors on frame `index`.
    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }
}

impl EncoderSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn begin(&mut self, spec: &StreamSpec) -> InstavidResult<()> {
        self.spec = Some(spec.clone());
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, frame: &RgbaImage) -> InstavidResult<()> {
        check_frame(self.spec.as_ref(), frame)?;
        if self.fail_at == Some(self.frames.len()) {
            return Err(InstavidError::encode(format!("Encoder rejected frame {}", self.frames.len())));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> InstavidResult<PathBuf> {
        Ok(Path::new("memory").to_path_buf())
    }

    fn abort(&mut self) {
        self.aborted = true;
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(w: u32, h: u32) -> StreamSpec {
        StreamSpec {
            width: w,
            height: h,
            fps: 30,
            total_frames: 2,
            format: ExportFormat::Webm,
            audio: None,
        }
    }

    #[test]
    fn test_png_sequence_writes_numbered_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PngSequenceSink::new(dir.path().join("frames"));
        sink.begin(&spec(4, 4)).unwrap();
        sink.push_frame(&RgbaImage::new(4, 4)).unwrap();
        sink.push_frame(&RgbaImage::new(4, 4)).unwrap();
        let out = sink.finish().unwrap();
        assert!(out.join("frame_00000.png").exists());
        assert!(out.join("frame_00001.png").exists());
        assert_eq!(sink.written(), 2);
    }

    #[test]
    fn test_png_sequence_abort_removes_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PngSequenceSink::new(dir.path());
        sink.begin(&spec(2, 2)).unwrap();
        sink.push_frame(&RgbaImage::new(2, 2)).unwrap();
        sink.abort();
        assert!(!dir.path().join("frame_00000.png").exists());
    }

    #[test]
    fn test_frame_size_mismatch_is_rejected() {
        let mut sink = MemorySink::new();
        assert!(sink.push_frame(&RgbaImage::new(2, 2)).is_err());
        sink.begin(&spec(4, 4)).unwrap();
        let err = sink.push_frame(&RgbaImage::new(2, 2)).unwrap_err();
        assert!(err.to_string().contains("2x2"));
    }

    #[test]
    fn test_memory_sink_failure_injection() {
        let mut sink = MemorySink::failing_at(1);
        sink.begin(&spec(1, 1)).unwrap();
        sink.push_frame(&RgbaImage::new(1, 1)).unwrap();
        assert!(sink.push_frame(&RgbaImage::new(1, 1)).is_err());
        sink.abort();
        assert!(sink.aborted && sink.frames.is_empty());
    }
}
