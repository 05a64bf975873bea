// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! WAV encoding for 16-bit mono PCM.
//!
//! Writes the canonical 44-byte RIFF header followed by little-endian
//! samples from the first channel of a render.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::offline::RenderedAudio;

/// Size of the RIFF/WAVE/fmt/data header in bytes
pub const HEADER_LEN: usize = 44;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Quantize a float sample to 16 bits, clamping to [-1, 1] first
pub fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

/// Write mono samples as a WAV stream
pub fn write_wav(w: &mut impl Write, samples: &[f32], sample_rate: u32) -> io::Result<()> {
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let data_size = samples.len() as u32 * block_align as u32;

    w.write_all(b"RIFF")?;
    w.write_all(&(36 + data_size).to_le_bytes())?;
    w.write_all(b"WAVE")?;

    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&1u16.to_le_bytes())?; // PCM
    w.write_all(&CHANNELS.to_le_bytes())?;
    w.write_all(&sample_rate.to_le_bytes())?;
    w.write_all(&(sample_rate * block_align as u32).to_le_bytes())?;
    w.write_all(&block_align.to_le_bytes())?;
    w.write_all(&BITS_PER_SAMPLE.to_le_bytes())?;

    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    for sample in samples {
        w.write_all(&quantize(*sample).to_le_bytes())?;
    }
    Ok(())
}

/// Encode the first channel of a render into WAV bytes
pub fn encode_wav(audio: &RenderedAudio) -> Vec<u8> {
    let samples = audio.channel(0).unwrap_or(&[]);
    let mut buf = Vec::with_capacity(HEADER_LEN + samples.len() * 2);
    // Writing into a Vec cannot fail
    let _ = write_wav(&mut buf, samples, audio.sample_rate());
    buf
}

/// Write a render to a WAV file
pub fn save_wav<P: AsRef<Path>>(audio: &RenderedAudio, path: P) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_wav(&mut writer, audio.channel(0).unwrap_or(&[]), audio.sample_rate())?;
    writer.flush()
}

/// Default export filename, e.g. `music-pixel-export-2026-01-31T12-00-00.wav`
pub fn export_filename(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("music-pixel-export-{}.wav", now.format("%Y-%m-%dT%H-%M-%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_header_layout() {
        let audio = RenderedAudio::new(44100, vec![vec![0.0; 10], vec![0.0; 10]]);
        let bytes = encode_wav(&audio);

        assert_eq!(bytes.len(), HEADER_LEN + 20);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 36 + 20);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u16::from_le_bytes([bytes[20], bytes[21]]), 1);
        assert_eq!(u16::from_le_bytes([bytes[22], bytes[23]]), 1);
        assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 44100);
        assert_eq!(u32::from_le_bytes(bytes[28..32].try_into().unwrap()), 88200);
        assert_eq!(u16::from_le_bytes([bytes[32], bytes[33]]), 2);
        assert_eq!(u16::from_le_bytes([bytes[34], bytes[35]]), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 20);
    }

    #[test]
    fn test_quantize_clamps() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(1.0), 32767);
        assert_eq!(quantize(-1.0), -32767);
        assert_eq!(quantize(2.5), 32767);
        assert_eq!(quantize(-7.0), -32767);
        assert_eq!(quantize(0.5), 16383);
    }

    #[test]
    fn test_samples_little_endian() {
        let audio = RenderedAudio::new(8000, vec![vec![1.0, -1.0]]);
        let bytes = encode_wav(&audio);
        assert_eq!(&bytes[44..46], &32767i16.to_le_bytes());
        assert_eq!(&bytes[46..48], &(-32767i16).to_le_bytes());
    }

    #[test]
    fn test_save_wav_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let audio = RenderedAudio::new(8000, vec![vec![0.25; 100]]);
        save_wav(&audio, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, encode_wav(&audio));
    }

    #[test]
    fn test_export_filename() {
        let now = chrono::Utc.with_ymd_and_hms(2026, 1, 31, 12, 5, 9).unwrap();
        assert_eq!(export_filename(now), "music-pixel-export-2026-01-31T12-05-09.wav");
    }
}
