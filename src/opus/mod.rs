// OPUS stream support (in OGG container)
//
// OPUS File Structure:
// - Identification header: "OpusHead" (8 bytes) in first page, 19 bytes total
//   for channel mapping family 0:
//   - Version (1 byte)
//   - Output Channel Count (1 byte)
//   - Pre-skip (2 bytes, little-endian)
//   - Input Sample Rate (4 bytes, little-endian)
//   - Output Gain (2 bytes, little-endian)
//   - Channel Mapping Family (1 byte)
// - Comment header: "OpusTags" (8 bytes) followed by Vorbis Comment in second page
// - Audio data pages, one Opus packet per segment
//
// Reference:
// - https://wiki.xiph.org/OggOpus
// - RFC 7845: Ogg Encapsulation for the Opus Audio Codec
// - RFC 6716 section 3.1: the TOC byte

pub mod packets;
pub mod toc;

use std::io::Read;

use serde::Serialize;
use tracing::debug;

use crate::error::HeaderError;
use crate::ogg::{PageReader, OGG_PAGE_HEADER_LEN, OGG_SIGNATURE};
use crate::{Error, Result};

pub use packets::{extract_packets, OpusPackets};
pub use toc::{frame_size, toc_config};

pub const OPUS_SIGNATURE: &[u8; 8] = b"OpusHead";
pub const OPUS_TAGS: &[u8; 8] = b"OpusTags";

/// Identification payload length for mapping family 0
pub const OPUS_HEAD_LEN: usize = 19;

/// Sequence number of the first audio page (after OpusHead and OpusTags)
pub const FIRST_AUDIO_PAGE_SEQUENCE: u32 = 2;

/// OpusHead identification header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpusHeader {
    pub version: u8,
    pub channels: u8,
    pub pre_skip: u16,
    pub input_sample_rate: u32,
    pub output_gain: u16,
    pub channel_mapping_family: u8,
}

impl OpusHeader {
    /// Parse a 19-byte identification payload
    pub fn parse(payload: &[u8]) -> std::result::Result<Self, HeaderError> {
        if payload.len() != OPUS_HEAD_LEN {
            return Err(HeaderError::BadPayloadLength(payload.len()));
        }
        if &payload[0..8] != OPUS_SIGNATURE {
            return Err(HeaderError::BadPayloadSignature);
        }

        Ok(OpusHeader {
            version: payload[8],
            channels: payload[9],
            pre_skip: u16::from_le_bytes([payload[10], payload[11]]),
            input_sample_rate: u32::from_le_bytes([payload[12], payload[13], payload[14], payload[15]]),
            output_gain: u16::from_le_bytes([payload[16], payload[17]]),
            channel_mapping_family: payload[18],
        })
    }

    /// Serialize back into the 19-byte identification payload
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(OPUS_HEAD_LEN);
        out.extend_from_slice(OPUS_SIGNATURE);
        out.push(self.version);
        out.push(self.channels);
        out.extend_from_slice(&self.pre_skip.to_le_bytes());
        out.extend_from_slice(&self.input_sample_rate.to_le_bytes());
        out.extend_from_slice(&self.output_gain.to_le_bytes());
        out.push(self.channel_mapping_family);
        out
    }
}

/// Read the identification page and parse its OpusHead payload
pub fn read_identification_header<R: Read>(reader: &mut PageReader<R>) -> Result<OpusHeader> {
    let page = reader.read_page()?.ok_or(Error::ShortRead {
        expected: OGG_PAGE_HEADER_LEN,
        actual: 0,
    })?;
    let header = &page.header;

    if &header.capture_pattern != OGG_SIGNATURE {
        return Err(HeaderError::BadCapturePattern(header.capture_pattern).into());
    }
    if header.version != 0 {
        return Err(HeaderError::BadVersion(header.version).into());
    }
    if !header.is_bos() {
        return Err(HeaderError::NotBeginningOfStream(header.header_type).into());
    }
    if page.segments.len() != 1 {
        return Err(HeaderError::BadSegmentCount(page.segments.len()).into());
    }

    let opus_header = OpusHeader::parse(&page.segments[0])?;
    debug!(
        channels = opus_header.channels,
        pre_skip = opus_header.pre_skip,
        input_sample_rate = opus_header.input_sample_rate,
        "read OpusHead"
    );
    Ok(opus_header)
}
