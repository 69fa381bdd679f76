//! Audio framing helpers
//!
//! The embedded client streams raw little-endian 16-bit mono PCM at 16 kHz.
//! The STT provider wants a WAV container, so raw payloads are wrapped with a
//! minimal header before upload.

use std::io::Cursor;

use crate::{Error, Result};

/// Sample rate of client audio (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Bytes per sample (16-bit)
pub const SAMPLE_WIDTH: usize = 2;

/// Channel count (mono)
pub const CHANNELS: u16 = 1;

/// Wrap raw PCM bytes in a WAV container for STT upload
///
/// The payload is interpreted as little-endian i16 mono samples at
/// [`SAMPLE_RATE`]. A trailing odd byte is dropped.
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn pcm_to_wav(pcm: &[u8]) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for sample in pcm.chunks_exact(SAMPLE_WIDTH) {
            let value = i16::from_le_bytes([sample[0], sample[1]]);
            writer
                .write_sample(value)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

/// Duration in seconds of a raw PCM payload
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pcm_duration_secs(len: usize) -> f64 {
    len as f64 / (SAMPLE_RATE as f64 * SAMPLE_WIDTH as f64)
}
