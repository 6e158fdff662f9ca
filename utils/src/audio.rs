use std::io::Cursor;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// Rate of the PCM16 audio the live API answers with.
pub const OUTPUT_PCM16_SAMPLE_RATE: u32 = 24000;
pub const OUTPUT_PCM16_BIT_DEPTH: u16 = 16;
pub const DEFAULT_GAIN: f32 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("wav encoding failed: {0}")]
    Wav(#[from] hound::Error),
}

/// Converts little-endian 16-bit mono PCM into a WAV container.
///
/// Every sample is normalized to [-1.0, 1.0], scaled by `gain` and hard clipped
/// before being written as integer PCM of `bit_depth` bits.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32, bit_depth: u16, gain: f32) -> Result<Vec<u8>, AudioError> {
    if pcm.len() % 2 != 0 {
        return Err(AudioError::InvalidArgument(format!(
            "pcm16 buffer must have an even length, got {} bytes",
            pcm.len()
        )));
    }
    if sample_rate == 0 {
        return Err(AudioError::InvalidArgument("sample rate must be positive".to_string()));
    }
    if !matches!(bit_depth, 8 | 16 | 24 | 32) {
        return Err(AudioError::InvalidArgument(format!(
            "unsupported bit depth: {}",
            bit_depth
        )));
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: bit_depth,
        sample_format: hound::SampleFormat::Int,
    };
    let full_scale = ((1i64 << (bit_depth - 1)) - 1) as f64;

    let mut cursor = Cursor::new(Vec::with_capacity(44 + pcm.len() / 2 * (bit_depth as usize / 8)));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for sample in normalize(pcm, gain) {
            writer.write_sample((sample as f64 * full_scale).round() as i32)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Normalizes PCM16 samples, applies `gain` and clips to [-1.0, 1.0].
pub fn normalize(pcm: &[u8], gain: f32) -> impl Iterator<Item = f32> + '_ {
    pcm.chunks_exact(2).map(move |chunk| {
        let v = i16::from_le_bytes([chunk[0], chunk[1]]);
        let amplified = (v as f32 / 32768.0) * gain;
        amplified.signum() * amplified.abs().min(1.0)
    })
}

/// Standard alphabet, accepting encoded runs with or without trailing padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Joins base64 fragments and decodes the result.
///
/// Fragments may split the encoding at any character. A fragment ending in
/// padding closes its run, so independently encoded fragments decode too.
pub fn decode_all(fragments: &[String]) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut run = String::new();
    for fragment in fragments {
        run.push_str(fragment);
        if fragment.ends_with('=') {
            bytes.extend(decode(&run));
            run.clear();
        }
    }
    if !run.is_empty() {
        bytes.extend(decode(&run));
    }
    bytes
}

pub fn decode(encoded: &str) -> Vec<u8> {
    match LENIENT.decode(encoded) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("failed to decode base64 audio: {}", e);
            Vec::new()
        }
    }
}

pub fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn read_back(wav: Vec<u8>) -> (hound::WavSpec, Vec<i32>) {
        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        let samples = reader.samples::<i32>().map(|s| s.unwrap()).collect();
        (spec, samples)
    }

    #[test]
    fn test_encodes_one_sample_per_two_bytes() {
        let input = pcm(&[0, 1000, -1000, 16384, -16384, 32767]);
        let wav = pcm_to_wav(&input, 24000, 16, DEFAULT_GAIN).unwrap();

        let (spec, samples) = read_back(wav);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(samples.len(), input.len() / 2);
        assert_eq!(samples[0], 0);
        assert_eq!(samples[3], 16384);
    }

    #[test]
    fn test_gain_clips_instead_of_wrapping() {
        let input = pcm(&[i16::MAX, i16::MIN, 20000, -20000]);
        let wav = pcm_to_wav(&input, 24000, 16, 2.0).unwrap();

        let (_, samples) = read_back(wav);
        assert_eq!(samples, vec![32767, -32767, 32767, -32767]);
        for normalized in normalize(&input, 2.0) {
            assert!(normalized.abs() <= 1.0);
        }
    }

    #[test]
    fn test_empty_input_yields_header_only() {
        let wav = pcm_to_wav(&[], 16000, 16, DEFAULT_GAIN).unwrap();
        let (_, samples) = read_back(wav);
        assert!(samples.is_empty());
    }

    #[test]
    fn test_supports_other_bit_depths() {
        let input = pcm(&[i16::MAX, 0]);
        let (spec, samples) = read_back(pcm_to_wav(&input, 8000, 24, DEFAULT_GAIN).unwrap());
        assert_eq!(spec.bits_per_sample, 24);
        assert_eq!(samples.len(), 2);
        assert!(samples[0] > 8_000_000);
    }

    #[test]
    fn test_rejects_odd_length_input() {
        let err = pcm_to_wav(&[0, 1, 2], 24000, 16, DEFAULT_GAIN).unwrap_err();
        assert!(matches!(err, AudioError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_bad_format_parameters() {
        assert!(matches!(
            pcm_to_wav(&[0, 0], 0, 16, DEFAULT_GAIN),
            Err(AudioError::InvalidArgument(_))
        ));
        assert!(matches!(
            pcm_to_wav(&[0, 0], 24000, 12, DEFAULT_GAIN),
            Err(AudioError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_decode_all_joins_fragments_split_mid_quantum() {
        let encoded = encode(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(encoded, "AQIDBAUG");
        let fragments = vec!["AQI".to_string(), "DBAUG".to_string()];
        assert_eq!(decode_all(&fragments), vec![1, 2, 3, 4, 5, 6]);

        let fragments = vec!["AQ".to_string(), "IDBAU=".to_string()];
        assert_eq!(decode_all(&fragments), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_decode_all_handles_independently_padded_fragments() {
        let fragments = vec![encode(&[1, 2]), encode(&[3]), encode(&[4, 5, 6])];
        assert_eq!(decode_all(&fragments), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_decode_all_skips_undecodable_runs() {
        let fragments = vec![encode(&[1, 2]), "%%%=".to_string(), encode(&[3, 4, 5])];
        assert_eq!(decode_all(&fragments), vec![1, 2, 3, 4, 5]);
    }
}
