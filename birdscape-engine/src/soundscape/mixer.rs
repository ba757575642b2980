//! Combined-track mixdown
//!
//! Decodes each per-species segment with symphonia, normalizes to stereo
//! f32 at the configured sample rate (rubato), and writes one combined WAV
//! track. Two layouts: `Overlay` sums all segments over the full window
//! (per-species duration mode), `Concat` splices them end to end
//! (shared-budget mode).

use birdscape_common::{Error, Result};
use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// The combined track is always stereo
pub const CHANNELS: u16 = 2;

/// Segment arrangement in the combined track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixLayout {
    /// All segments summed over the full window, peak-normalized
    Overlay,
    /// Segments spliced sequentially
    Concat,
}

/// Decoded segment: interleaved stereo f32 at its native rate
struct DecodedSegment {
    samples: Vec<f32>,
    sample_rate: u32,
}

/// Mix segment files into one combined WAV at `output`
///
/// The output is exactly `total_duration_secs` long at `sample_rate`;
/// segments are truncated or zero-padded to fit. Unreadable or empty
/// segments fail the mixdown (they already survived synthesis, so a decode
/// fault here is a real error, not a skip).
pub fn mix_segments(
    segments: &[impl AsRef<Path>],
    layout: MixLayout,
    sample_rate: u32,
    total_duration_secs: f64,
    output: &Path,
) -> Result<()> {
    let total_frames = (total_duration_secs * sample_rate as f64).round() as usize;
    let mut mix = vec![0.0f32; total_frames * CHANNELS as usize];
    let mut cursor = 0usize; // sample index, Concat only

    for path in segments {
        let path = path.as_ref();
        let segment = decode_file(path)?;
        if segment.samples.is_empty() {
            tracing::warn!(path = %path.display(), "Segment decoded to zero samples");
            continue;
        }
        let samples = resample(&segment.samples, segment.sample_rate, sample_rate)?;

        match layout {
            MixLayout::Overlay => {
                let n = samples.len().min(mix.len());
                for i in 0..n {
                    mix[i] += samples[i];
                }
            }
            MixLayout::Concat => {
                if cursor >= mix.len() {
                    tracing::warn!(
                        path = %path.display(),
                        "Combined track full, dropping remaining segments"
                    );
                    break;
                }
                let n = samples.len().min(mix.len() - cursor);
                mix[cursor..cursor + n].copy_from_slice(&samples[..n]);
                cursor += n;
            }
        }
    }

    // Summing can clip; scale the whole mix back under full scale
    if layout == MixLayout::Overlay {
        let peak = mix.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        if peak > 1.0 {
            for sample in mix.iter_mut() {
                *sample /= peak;
            }
        }
    }

    write_wav(output, &mix, sample_rate)?;

    tracing::info!(
        output = %output.display(),
        layout = ?layout,
        frames = total_frames,
        sample_rate,
        "Wrote combined soundscape track"
    );

    Ok(())
}

/// Decode an audio file to interleaved stereo f32 at its native rate
fn decode_file(path: &Path) -> Result<DecodedSegment> {
    let file = File::open(path)
        .map_err(|e| Error::Audio(format!("cannot open segment {}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::Audio(format!("unrecognized segment format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| Error::Audio(format!("no audio track in {}", path.display())))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params.sample_rate.unwrap_or(44100);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| Error::Audio(format!("unsupported segment codec: {}", e)))?;

    let mut native: Vec<f32> = Vec::new();
    let mut channels = CHANNELS as usize;
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break; // EOF
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(Error::Audio(format!("decode failed: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Recoverable corruption: skip the packet
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping corrupt packet");
                continue;
            }
            Err(e) => return Err(Error::Audio(format!("decode failed: {}", e))),
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            channels = spec.channels.count();
            sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        }
        if let Some(buf) = &mut sample_buf {
            buf.copy_interleaved_ref(decoded);
            native.extend_from_slice(buf.samples());
        }
    }

    Ok(DecodedSegment {
        samples: to_stereo(&native, channels),
        sample_rate,
    })
}

/// Normalize channel count to interleaved stereo
///
/// Mono is duplicated; multi-channel is downmixed by averaging even
/// channels into left and odd into right.
fn to_stereo(samples: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        2 => samples.to_vec(),
        1 => {
            let mut stereo = Vec::with_capacity(samples.len() * 2);
            for &sample in samples {
                stereo.push(sample);
                stereo.push(sample);
            }
            stereo
        }
        n => {
            let frames = samples.len() / n;
            let mut stereo = Vec::with_capacity(frames * 2);
            let half = (n as f32 / 2.0).max(1.0);
            for frame in 0..frames {
                let mut left = 0.0f32;
                let mut right = 0.0f32;
                for ch in 0..n {
                    let sample = samples[frame * n + ch];
                    if ch % 2 == 0 {
                        left += sample;
                    } else {
                        right += sample;
                    }
                }
                stereo.push(left / half);
                stereo.push(right / half);
            }
            stereo
        }
    }
}

/// Resample interleaved stereo audio to `output_rate`
///
/// Whole-buffer conversion through rubato's polynomial resampler; a copy
/// is returned unchanged when the rates already match.
fn resample(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate {
        return Ok(input.to_vec());
    }

    let frames = input.len() / CHANNELS as usize;
    if frames == 0 {
        return Ok(Vec::new());
    }

    tracing::debug!(input_rate, output_rate, frames, "Resampling segment");

    let planar_input = deinterleave(input);

    let mut resampler = FastFixedIn::<f32>::new(
        output_rate as f64 / input_rate as f64,
        1.0,
        PolynomialDegree::Septic,
        frames,
        CHANNELS as usize,
    )
    .map_err(|e| Error::Audio(format!("failed to create resampler: {}", e)))?;

    let planar_output = resampler
        .process(&planar_input, None)
        .map_err(|e| Error::Audio(format!("resampling failed: {}", e)))?;

    Ok(interleave(&planar_output))
}

/// [L, R, L, R, ...] -> [[L, L, ...], [R, R, ...]]
fn deinterleave(samples: &[f32]) -> Vec<Vec<f32>> {
    let frames = samples.len() / 2;
    let mut planar = vec![Vec::with_capacity(frames); 2];
    for frame in samples.chunks_exact(2) {
        planar[0].push(frame[0]);
        planar[1].push(frame[1]);
    }
    planar
}

/// [[L, L, ...], [R, R, ...]] -> [L, R, L, R, ...]
fn interleave(planar: &[Vec<f32>]) -> Vec<f32> {
    if planar.len() < 2 {
        return Vec::new();
    }
    let frames = planar[0].len().min(planar[1].len());
    let mut interleaved = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        interleaved.push(planar[0][i]);
        interleaved.push(planar[1][i]);
    }
    interleaved
}

/// Write interleaved stereo f32 samples as a 32-bit-float WAV file
fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: CHANNELS,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| Error::Audio(format!("cannot create {}: {}", path.display(), e)))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| Error::Audio(format!("WAV write failed: {}", e)))?;
    }
    writer
        .finalize()
        .map_err(|e| Error::Audio(format!("WAV finalize failed: {}", e)))?;

    Ok(())
}
