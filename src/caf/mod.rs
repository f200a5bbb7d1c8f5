// CAF (Core Audio Format) container support
//
// CAF File Structure (all integers big-endian):
// - File Header (8 bytes)
//   - File Type: "caff" (4 bytes)
//   - File Version: 1 (2 bytes)
//   - File Flags: 0 (2 bytes)
// - Chunks, each:
//   - Chunk Type (4 bytes)
//   - Chunk Size (8 bytes, signed, payload only)
//   - Payload (Chunk Size bytes)
//
// Chunks written for Opus:
// - desc: Audio Description (32 bytes)
// - chan: Channel Layout
// - info: Information strings
// - data: Audio Data (edit count + packets)
// - pakt: Packet Table (packet sizes as variable-length integers)
//
// Reference:
// - Apple Core Audio Format Specification 1.0

pub mod chunks;
pub mod decode;
pub mod encode;
pub mod varint;

pub use chunks::{
    AudioData, AudioDescription, CafFile, ChannelDescription, ChannelLayout, Chunk, ChunkHeader, FileHeader,
    Information, PacketTable, PacketTableHeader,
};
pub use crate::utils::io::ByteCursor;

/// CAF file type
pub const CAF_SIGNATURE: &[u8; 4] = b"caff";
pub const CAF_VERSION: u16 = 1;

/// File header length
pub const CAF_FILE_HEADER_LEN: usize = 8;

/// Chunk header length (type + size)
pub const CAF_CHUNK_HEADER_LEN: usize = 12;

// Chunk types
pub const CHUNK_AUDIO_DESCRIPTION: [u8; 4] = *b"desc";
pub const CHUNK_CHANNEL_LAYOUT: [u8; 4] = *b"chan";
pub const CHUNK_INFORMATION: [u8; 4] = *b"info";
pub const CHUNK_AUDIO_DATA: [u8; 4] = *b"data";
pub const CHUNK_PACKET_TABLE: [u8; 4] = *b"pakt";
pub const CHUNK_MIDI: [u8; 4] = *b"midi";

/// Audio format id for Opus
pub const FORMAT_OPUS: [u8; 4] = *b"opus";

/// Audio description payload length
pub const AUDIO_DESCRIPTION_LEN: usize = 32;

/// Packet table header length, before the size entries
pub const PACKET_TABLE_HEADER_LEN: usize = 24;

// Channel layout tags
pub const CHANNEL_LAYOUT_TAG_MONO: u32 = 6553601; // (100 << 16) | 1
pub const CHANNEL_LAYOUT_TAG_STEREO: u32 = 6619138; // (101 << 16) | 2

/// Channel layout tag for an Opus output channel count
pub fn channel_layout_tag(channels: u8) -> u32 {
    if channels == 2 {
        CHANNEL_LAYOUT_TAG_STEREO
    } else {
        CHANNEL_LAYOUT_TAG_MONO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_layout_tag() {
        assert_eq!(channel_layout_tag(2), 6619138);
        assert_eq!(channel_layout_tag(1), 6553601);
        assert_eq!(channel_layout_tag(0), 6553601);
        assert_eq!(channel_layout_tag(6), 6553601);
        assert_eq!(CHANNEL_LAYOUT_TAG_MONO, (100 << 16) | 1);
        assert_eq!(CHANNEL_LAYOUT_TAG_STEREO, (101 << 16) | 2);
    }
}
