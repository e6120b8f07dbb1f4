//! Small media files written on the fly for tests.

use std::fs;
use std::path::Path;

pub(crate) const WAV_SAMPLE_RATE: u32 = 8000;

/// Write `seconds` of silent 16-bit mono PCM as a WAV file.
pub(crate) fn write_wav(path: &Path, seconds: u32) {
    let samples = WAV_SAMPLE_RATE * seconds;
    let data_len = samples * 2;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&WAV_SAMPLE_RATE.to_le_bytes());
    bytes.extend_from_slice(&(WAV_SAMPLE_RATE * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);

    fs::write(path, bytes).unwrap();
}
