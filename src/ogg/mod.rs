// OGG container support
//
// OGG File Structure:
// - OGG Page Header (27 bytes)
//   - Capture Pattern: "OggS" (4 bytes)
//   - Version: 0 (1 byte)
//   - Header Type: 1=continuation, 2=bos, 4=eos (1 byte)
//   - Granule Position (8 bytes, little-endian)
//   - Bitstream Serial Number (4 bytes, little-endian)
//   - Page Sequence Number (4 bytes, little-endian)
//   - CRC Checksum (4 bytes, not verified)
//   - Number of Page Segments (1 byte)
//   - Segment Table (variable)
// - Segment payloads, in lacing order
//
// Only a single logical stream is read; pages are consumed strictly in file order.

pub mod page;

pub use page::{decode_lacing, encode_lacing, OggPage, OggPageHeader, PageReader};

/// OGG capture pattern
pub const OGG_SIGNATURE: &[u8; 4] = b"OggS";

/// Fixed page header length, segment table excluded
pub const OGG_PAGE_HEADER_LEN: usize = 27;

/// Lacing value that continues a segment
pub const OGG_LACING_CONTINUE: u8 = 255;

// OGG page header types
pub const OGG_HEADER_TYPE_CONTINUATION: u8 = 0x01;
pub const OGG_HEADER_TYPE_BOS: u8 = 0x02; // Beginning of Stream
pub const OGG_HEADER_TYPE_EOS: u8 = 0x04; // End of Stream
