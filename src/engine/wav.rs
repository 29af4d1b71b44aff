//! WAV file I/O
//!
//! Reads and writes uncompressed integer PCM in RIFF/WAVE containers.
//! Samples are converted to normalized `f32` on read and de-interleaved into
//! one buffer per channel; on write they are clamped to [-1.0, 1.0], scaled to
//! the target bit depth and interleaved frame by frame.
//!
//! Supported sample widths: 8-bit (unsigned, offset 128), 16, 24 and 32-bit
//! (signed little-endian). The whole file is buffered; there is no streaming.

use std::fs::{self, File};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::Path;

use log::{debug, warn};
use serde::Serialize;

use crate::engine::buffer::{self, AudioBuffer, MultiChannelBuffer};
use crate::error::{DspError, Result};

const RIFF_TAG: &[u8; 4] = b"RIFF";
const WAVE_TAG: &[u8; 4] = b"WAVE";
const FMT_TAG: &[u8; 4] = b"fmt ";
const DATA_TAG: &[u8; 4] = b"data";

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Size of the plain PCM `fmt ` body
const PCM_FMT_LEN: usize = 16;
/// Size of a WAVE_FORMAT_EXTENSIBLE `fmt ` body (cbSize = 22)
const EXTENSIBLE_FMT_LEN: usize = 40;
/// Offset of the sub-format GUID inside an extensible `fmt ` body
const SUBFORMAT_OFFSET: usize = 24;

/// RIFF header + `fmt ` chunk + `data` chunk header
const CANONICAL_HEADER_LEN: usize = 44;

/// Bit depth used when the caller does not ask for another one
pub const DEFAULT_BITS_PER_SAMPLE: u16 = 16;

// ============================================================================
// Format descriptors
// ============================================================================

/// Supported PCM sample widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "u16")]
pub enum BitDepth {
    Eight,
    #[default]
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BitDepth {
    /// Bits per sample as stored in the header
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
            BitDepth::ThirtyTwo => 32,
        }
    }

    /// Bytes occupied by one sample
    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// Magnitude that maps to 1.0 (2^(bits-1))
    pub fn full_scale(self) -> f64 {
        (1u64 << (self.bits() - 1)) as f64
    }

    /// Size of one quantization step in normalized units
    pub fn step(self) -> f64 {
        1.0 / self.full_scale()
    }
}

impl TryFrom<u16> for BitDepth {
    type Error = DspError;

    fn try_from(bits: u16) -> Result<Self> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            24 => Ok(BitDepth::TwentyFour),
            32 => Ok(BitDepth::ThirtyTwo),
            _ => Err(DspError::UnsupportedFormat {
                format: format!("{}-bit PCM (only 8, 16, 24, 32 supported)", bits),
            }),
        }
    }
}

impl From<BitDepth> for u16 {
    fn from(depth: BitDepth) -> Self {
        depth.bits()
    }
}

/// Header facts discovered on read or supplied on write
///
/// Lives only for the duration of a single read or write call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContainerMetadata {
    /// Samples per second per channel
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub num_channels: u16,
    /// Width of each stored sample
    pub bits_per_sample: BitDepth,
}

impl ContainerMetadata {
    /// Bytes per interleaved frame
    pub fn block_align(&self) -> usize {
        self.num_channels as usize * self.bits_per_sample.bytes()
    }

    /// Bytes per second of payload
    pub fn byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.block_align() as u64
    }
}

/// Write format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Bit depth: 8, 16, 24 or 32 (default: 16)
    pub bits_per_sample: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        PcmFormat::cd_quality()
    }
}

impl PcmFormat {
    /// Create a 16-bit format at the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        PcmFormat {
            sample_rate,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
        }
    }

    /// Same sample rate, different bit depth
    pub fn with_bits(self, bits_per_sample: u16) -> Self {
        PcmFormat {
            bits_per_sample,
            ..self
        }
    }

    /// Create format for CD quality (44.1kHz, 16-bit)
    pub fn cd_quality() -> Self {
        PcmFormat::new(44100)
    }

    /// Validate this format for `num_channels` channels
    ///
    /// # Errors
    /// * `UnsupportedFormat` - zero sample rate, zero or too many channels,
    ///   or an unsupported bit depth
    pub fn metadata_for(&self, num_channels: usize) -> Result<ContainerMetadata> {
        if self.sample_rate == 0 {
            return Err(DspError::UnsupportedFormat {
                format: "0 Hz sample rate".to_string(),
            });
        }

        let num_channels = match u16::try_from(num_channels) {
            Ok(0) | Err(_) => {
                return Err(DspError::UnsupportedFormat {
                    format: format!("{}-channel audio", num_channels),
                })
            }
            Ok(n) => n,
        };

        Ok(ContainerMetadata {
            sample_rate: self.sample_rate,
            num_channels,
            bits_per_sample: BitDepth::try_from(self.bits_per_sample)?,
        })
    }
}

// ============================================================================
// Reading
// ============================================================================

/// Read a WAV file into one buffer per channel
///
/// # Arguments
/// * `path` - Path to the WAV file
///
/// # Returns
/// * `Ok((channels, metadata))` - `channels[c][k]` is channel `c` of frame `k`
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `UnreadableHeader` - Bad RIFF/WAVE tags, truncated or inconsistent `fmt `
///   chunk, or no `data` chunk
/// * `UnsupportedFormat` - Compressed/float format code or unsupported bit depth
/// * `CorruptPayload` - Payload is not a whole number of frames or is truncated
pub fn read_multi(path: impl AsRef<Path>) -> Result<(MultiChannelBuffer, ContainerMetadata)> {
    let path = path.as_ref();
    let bytes = read_file(path)?;
    let wav = parse(path, &bytes)?;
    let channels = decode_payload(wav.payload, &wav.metadata);

    debug!(
        "Read {}: {} Hz, {} channel(s), {}-bit, {} frames",
        path.display(),
        wav.metadata.sample_rate,
        wav.metadata.num_channels,
        wav.metadata.bits_per_sample.bits(),
        channels.first().map_or(0, Vec::len)
    );

    Ok((channels, wav.metadata))
}

/// Read a single-channel WAV file
///
/// Multi-channel files are rejected rather than mixed down or truncated to
/// channel 0; use [`read_multi`] for those.
///
/// # Errors
/// Everything [`read_multi`] returns, plus
/// * `ChannelCountMismatch` - If the file has more than one channel
pub fn read_mono(path: impl AsRef<Path>) -> Result<(AudioBuffer, ContainerMetadata)> {
    let path = path.as_ref();
    let bytes = read_file(path)?;
    let wav = parse(path, &bytes)?;

    if wav.metadata.num_channels != 1 {
        return Err(DspError::ChannelCountMismatch {
            expected: 1,
            actual: wav.metadata.num_channels as usize,
        });
    }

    let mut channels = decode_payload(wav.payload, &wav.metadata);
    let samples = channels.pop().unwrap_or_default();

    debug!(
        "Read {}: {} Hz mono, {} frames",
        path.display(),
        wav.metadata.sample_rate,
        samples.len()
    );

    Ok((samples, wav.metadata))
}

/// Parse a WAV header without decoding samples
///
/// # Returns
/// * `Ok((metadata, frames))` - header facts and the number of frames in the
///   `data` chunk
pub fn probe(path: impl AsRef<Path>) -> Result<(ContainerMetadata, usize)> {
    let path = path.as_ref();
    let bytes = read_file(path)?;
    let wav = parse(path, &bytes)?;
    let frames = wav.payload.len() / wav.metadata.block_align();
    Ok((wav.metadata, frames))
}

// ============================================================================
// Writing
// ============================================================================

/// Write one buffer per channel to a WAV file
///
/// All validation happens before the file is created, so a rejected call
/// leaves the filesystem untouched.
///
/// # Arguments
/// * `path` - Path where the file will be written (created or overwritten)
/// * `channels` - One buffer per channel, all of equal length
/// * `format` - Sample rate and bit depth
///
/// # Errors
/// * `UnsupportedFormat` - zero sample rate, no channels, unsupported bit
///   depth, or a payload too large for a RIFF container
/// * `ChannelLengthMismatch` - If channel lengths differ
/// * `WriteIo` - If the file cannot be created or written
pub fn write_multi<C: AsRef<[f32]>>(
    path: impl AsRef<Path>,
    channels: &[C],
    format: PcmFormat,
) -> Result<()> {
    let path = path.as_ref();
    let metadata = format.metadata_for(channels.len())?;
    let frames = buffer::frame_count(channels)?;

    let data_len = frames
        .checked_mul(metadata.block_align())
        .and_then(|len| u32::try_from(len).ok())
        .filter(|len| *len <= u32::MAX - CANONICAL_HEADER_LEN as u32)
        .ok_or_else(|| DspError::UnsupportedFormat {
            format: format!("{} frames exceeds the 4 GiB RIFF limit", frames),
        })?;

    let interleaved = buffer::interleave(channels);

    let clamped = interleaved.iter().filter(|s| s.abs() > 1.0).count();
    if clamped > 0 {
        warn!(
            "Clamped {} of {} samples to [-1.0, 1.0] while writing {}",
            clamped,
            interleaved.len(),
            path.display()
        );
    }

    write_file(path, &metadata, data_len, &interleaved).map_err(|source| DspError::WriteIo {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        "Wrote {}: {} Hz, {} channel(s), {}-bit, {} frames",
        path.display(),
        metadata.sample_rate,
        metadata.num_channels,
        metadata.bits_per_sample.bits(),
        frames
    );

    Ok(())
}

/// Write a single buffer to a WAV file with `num_channels` channels
///
/// With more than one channel the same samples are written to every channel
/// (duplicated, not mixed).
///
/// # Errors
/// Same as [`write_multi`]; `num_channels == 0` is `UnsupportedFormat`.
pub fn write_mono(
    path: impl AsRef<Path>,
    samples: &[f32],
    num_channels: u16,
    format: PcmFormat,
) -> Result<()> {
    let channels: Vec<&[f32]> = std::iter::repeat(samples)
        .take(num_channels as usize)
        .collect();
    write_multi(path, &channels, format)
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// A validated WAV file borrowed from its raw bytes
struct ParsedWav<'a> {
    metadata: ContainerMetadata,
    payload: &'a [u8],
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DspError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => DspError::Io(e),
    })
}

fn unreadable(path: &Path, reason: impl Into<String>) -> DspError {
    DspError::UnreadableHeader {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn tag_name(tag: &[u8]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

/// Walk the RIFF chunk list and validate `fmt ` and `data`
fn parse<'a>(path: &Path, bytes: &'a [u8]) -> Result<ParsedWav<'a>> {
    if bytes.len() < 12 {
        return Err(unreadable(
            path,
            format!("{} bytes is too short for a RIFF header", bytes.len()),
        ));
    }
    if &bytes[0..4] != RIFF_TAG {
        return Err(unreadable(path, "missing RIFF tag"));
    }
    if &bytes[8..12] != WAVE_TAG {
        return Err(unreadable(path, "missing WAVE tag"));
    }

    let mut fmt: Option<&[u8]> = None;
    // (bytes present, bytes declared)
    let mut data: Option<(&[u8], usize)> = None;
    let mut offset = 12;

    while offset + 8 <= bytes.len() && (fmt.is_none() || data.is_none()) {
        let id = &bytes[offset..offset + 4];
        let len = read_u32(bytes, offset + 4) as usize;
        let start = offset + 8;
        let available = bytes.len() - start;

        if id == DATA_TAG {
            data = Some((&bytes[start..start + len.min(available)], len));
        } else if len > available {
            return Err(unreadable(
                path,
                format!("'{}' chunk overruns end of file", tag_name(id)),
            ));
        } else if id == FMT_TAG {
            fmt = Some(&bytes[start..start + len]);
        } else {
            debug!("Skipping '{}' chunk ({} bytes)", tag_name(id), len);
        }

        // Chunk bodies are padded to an even length
        offset = start.saturating_add(len).saturating_add(len & 1);
    }

    let fmt = fmt.ok_or_else(|| unreadable(path, "missing 'fmt ' chunk"))?;
    let metadata = parse_fmt(path, fmt)?;

    let (payload, declared) = data.ok_or_else(|| unreadable(path, "missing 'data' chunk"))?;
    if payload.len() < declared {
        return Err(DspError::CorruptPayload {
            reason: format!(
                "data chunk declares {} bytes but only {} remain",
                declared,
                payload.len()
            ),
        });
    }
    if payload.len() % metadata.block_align() != 0 {
        return Err(DspError::CorruptPayload {
            reason: format!(
                "{} payload bytes is not a multiple of the {}-byte frame",
                payload.len(),
                metadata.block_align()
            ),
        });
    }

    Ok(ParsedWav { metadata, payload })
}

/// Decode the `fmt ` chunk body
fn parse_fmt(path: &Path, fmt: &[u8]) -> Result<ContainerMetadata> {
    if fmt.len() < PCM_FMT_LEN {
        return Err(unreadable(
            path,
            format!(
                "'fmt ' chunk is {} bytes, need at least {}",
                fmt.len(),
                PCM_FMT_LEN
            ),
        ));
    }

    let format_code = read_u16(fmt, 0);
    let num_channels = read_u16(fmt, 2);
    let sample_rate = read_u32(fmt, 4);
    let byte_rate = read_u32(fmt, 8);
    let block_align = read_u16(fmt, 12);
    let bits = read_u16(fmt, 14);

    if num_channels == 0 {
        return Err(unreadable(path, "channel count is zero"));
    }
    if sample_rate == 0 {
        return Err(unreadable(path, "sample rate is zero"));
    }

    let format_code = if format_code == WAVE_FORMAT_EXTENSIBLE {
        if fmt.len() < EXTENSIBLE_FMT_LEN {
            return Err(unreadable(path, "extensible 'fmt ' chunk is truncated"));
        }
        read_u16(fmt, SUBFORMAT_OFFSET)
    } else {
        format_code
    };

    if format_code != WAVE_FORMAT_PCM {
        return Err(DspError::UnsupportedFormat {
            format: format!(
                "WAV format code 0x{:04X} (only integer PCM is supported)",
                format_code
            ),
        });
    }

    let metadata = ContainerMetadata {
        sample_rate,
        num_channels,
        bits_per_sample: BitDepth::try_from(bits)?,
    };

    if block_align as usize != metadata.block_align() {
        return Err(unreadable(
            path,
            format!(
                "block align {} does not match {} channel(s) of {}-bit samples",
                block_align, num_channels, bits
            ),
        ));
    }
    // Decoding never uses the byte rate
    if byte_rate as u64 != metadata.byte_rate() {
        warn!(
            "{}: byte rate {} does not match {} Hz x {} bytes, ignoring",
            path.display(),
            byte_rate,
            sample_rate,
            block_align
        );
    }

    Ok(metadata)
}

/// Convert the raw payload into normalized per-channel samples
fn decode_payload(payload: &[u8], metadata: &ContainerMetadata) -> MultiChannelBuffer {
    let depth = metadata.bits_per_sample;
    let samples: Vec<f32> = payload
        .chunks_exact(depth.bytes())
        .map(|raw| decode_sample(raw, depth))
        .collect();

    buffer::deinterleave(&samples, metadata.num_channels as usize)
}

/// Decode one little-endian sample
fn decode_sample(raw: &[u8], depth: BitDepth) -> f32 {
    let value = match depth {
        BitDepth::Eight => raw[0] as i32 - 128,
        BitDepth::Sixteen => i16::from_le_bytes([raw[0], raw[1]]) as i32,
        // Shift into the top three bytes so the sign bit lands in bit 31
        BitDepth::TwentyFour => i32::from_le_bytes([0, raw[0], raw[1], raw[2]]) >> 8,
        BitDepth::ThirtyTwo => i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
    };
    (value as f64 / depth.full_scale()) as f32
}

/// Encode one sample into `out`, returning the number of bytes used
///
/// Out-of-range input is clamped to [-1.0, 1.0]; NaN encodes as silence.
fn encode_sample(sample: f32, depth: BitDepth, out: &mut [u8; 4]) -> usize {
    let full_scale = depth.full_scale();
    let scaled = (sample.clamp(-1.0, 1.0) as f64 * full_scale)
        .round()
        .clamp(-full_scale, full_scale - 1.0) as i32;

    match depth {
        BitDepth::Eight => out[0] = (scaled + 128) as u8,
        BitDepth::Sixteen => out[..2].copy_from_slice(&(scaled as i16).to_le_bytes()),
        BitDepth::TwentyFour => out[..3].copy_from_slice(&scaled.to_le_bytes()[..3]),
        BitDepth::ThirtyTwo => out.copy_from_slice(&scaled.to_le_bytes()),
    }

    depth.bytes()
}

fn write_header<W: Write>(
    writer: &mut W,
    metadata: &ContainerMetadata,
    data_len: u32,
) -> io::Result<()> {
    let pad = data_len & 1;
    let riff_len = (CANONICAL_HEADER_LEN as u32 - 8) + data_len + pad;

    writer.write_all(RIFF_TAG)?;
    writer.write_all(&riff_len.to_le_bytes())?;
    writer.write_all(WAVE_TAG)?;

    writer.write_all(FMT_TAG)?;
    writer.write_all(&(PCM_FMT_LEN as u32).to_le_bytes())?;
    writer.write_all(&WAVE_FORMAT_PCM.to_le_bytes())?;
    writer.write_all(&metadata.num_channels.to_le_bytes())?;
    writer.write_all(&metadata.sample_rate.to_le_bytes())?;
    writer.write_all(&(metadata.byte_rate() as u32).to_le_bytes())?;
    writer.write_all(&(metadata.block_align() as u16).to_le_bytes())?;
    writer.write_all(&metadata.bits_per_sample.bits().to_le_bytes())?;

    writer.write_all(DATA_TAG)?;
    writer.write_all(&data_len.to_le_bytes())?;
    Ok(())
}

fn write_file(
    path: &Path,
    metadata: &ContainerMetadata,
    data_len: u32,
    interleaved: &[f32],
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_header(&mut writer, metadata, data_len)?;

    let depth = metadata.bits_per_sample;
    let mut scratch = [0u8; 4];
    for &sample in interleaved {
        let len = encode_sample(sample, depth, &mut scratch);
        writer.write_all(&scratch[..len])?;
    }

    if data_len & 1 == 1 {
        writer.write_all(&[0])?;
    }

    writer.flush()
}

// ============================================================================
// Tests
// ============================================================================
