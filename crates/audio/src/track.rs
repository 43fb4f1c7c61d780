//! Mono PCM buffers.

use std::io::Write;
use std::path::Path;

use instavid_common::error::{InstavidError, InstavidResult};

/// A mono float track. Samples are kept in [-1, 1] by [`AudioTrack::mix_at`].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    sample_rate: u32,
    samples: Vec<f32>,
}

impl AudioTrack {
    /// Silent track long enough to cover `duration_secs`.
    pub fn silent(duration_secs: f64, sample_rate: u32) -> Self {
        let len = (duration_secs.max(0.0) * sample_rate as f64).ceil() as usize;
        Self {
            sample_rate,
            samples: vec![0.0; len],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Add `clip` starting at `offset_secs`. Whatever runs past the end of
    /// the track is dropped. Returns the number of samples written.
    pub fn mix_at(&mut self, offset_secs: f64, clip: &[f32]) -> usize {
        if offset_secs < 0.0 || !offset_secs.is_finite() {
            return 0;
        }
        let start = (offset_secs * self.sample_rate as f64).round() as usize;
        if start >= self.samples.len() {
            return 0;
        }
        let end = (start + clip.len()).min(self.samples.len());
        for (dst, src) in self.samples[start..end].iter_mut().zip(clip) {
            *dst = (*dst + src).clamp(-1.0, 1.0);
        }
        end - start
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|s| *s == 0.0)
    }

    /// Signed 16-bit little-endian PCM.
    pub fn to_s16le(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.samples.len() * 2);
        for s in &self.samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }

    /// Write a 16-bit mono WAV file.
    pub fn write_wav(&self, path: &Path) -> InstavidResult<()> {
        let pcm = self.to_s16le();
        let data_len = u32::try_from(pcm.len())
            .map_err(|_| InstavidError::audio("track too long for a WAV container"))?;
        let byte_rate = self.sample_rate * 2;

        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        file.write_all(b"RIFF")?;
        file.write_all(&(36 + data_len).to_le_bytes())?;
        file.write_all(b"WAVEfmt ")?;
        file.write_all(&16u32.to_le_bytes())?; // fmt chunk size
        file.write_all(&1u16.to_le_bytes())?; // PCM
        file.write_all(&1u16.to_le_bytes())?; // mono
        file.write_all(&self.sample_rate.to_le_bytes())?;
        file.write_all(&byte_rate.to_le_bytes())?;
        file.write_all(&2u16.to_le_bytes())?; // block align
        file.write_all(&16u16.to_le_bytes())?; // bits per sample
        file.write_all(b"data")?;
        file.write_all(&data_len.to_le_bytes())?;
        file.write_all(&pcm)?;
        file.flush()?;

        tracing::debug!(
            path = %path.display(),
            samples = self.samples.len(),
            "Wrote audio track"
        );
        Ok(())
    }
}
