use std::io::Read;

use tracing::{debug, warn};

use crate::ogg::{
    OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_CONTINUATION, OGG_HEADER_TYPE_EOS, OGG_LACING_CONTINUE,
    OGG_PAGE_HEADER_LEN, OGG_SIGNATURE,
};
use crate::utils::io::{read_exact_or_short, read_full};
use crate::{Error, Result};

/// OGG Page Header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OggPageHeader {
    pub capture_pattern: [u8; 4],
    pub version: u8,
    pub header_type: u8,
    pub granule_position: u64,
    pub bitstream_serial: u32,
    pub page_sequence: u32,
    pub crc: u32,
    pub segment_count: u8,
    pub segment_table: Vec<u8>,
}

/// OGG Page with its lacing already resolved into segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OggPage {
    pub header: OggPageHeader,
    pub segments: Vec<Vec<u8>>,
}

impl OggPageHeader {
    /// Parse the fixed 27-byte part of a page header
    fn parse_fixed(header: &[u8; OGG_PAGE_HEADER_LEN]) -> Self {
        let mut capture_pattern = [0u8; 4];
        capture_pattern.copy_from_slice(&header[0..4]);
        let mut granule = [0u8; 8];
        granule.copy_from_slice(&header[6..14]);
        let mut serial = [0u8; 4];
        serial.copy_from_slice(&header[14..18]);
        let mut sequence = [0u8; 4];
        sequence.copy_from_slice(&header[18..22]);
        let mut crc = [0u8; 4];
        crc.copy_from_slice(&header[22..26]);

        OggPageHeader {
            capture_pattern,
            version: header[4],
            header_type: header[5],
            granule_position: u64::from_le_bytes(granule),
            bitstream_serial: u32::from_le_bytes(serial),
            page_sequence: u32::from_le_bytes(sequence),
            crc: u32::from_le_bytes(crc),
            segment_count: header[26],
            segment_table: Vec::new(),
        }
    }

    /// Calculate total page data size from segment table
    pub fn data_size(&self) -> usize {
        self.segment_table.iter().map(|&x| x as usize).sum()
    }

    pub fn has_valid_capture_pattern(&self) -> bool {
        &self.capture_pattern == OGG_SIGNATURE
    }

    /// First packet on this page continues one from the previous page
    pub fn is_continuation(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_CONTINUATION != 0
    }

    /// Check if this is the beginning of a stream
    pub fn is_bos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_BOS != 0
    }

    pub fn is_eos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_EOS != 0
    }
}

impl OggPage {
    /// Build a page around already-split segments, computing its lacing table.
    ///
    /// Every segment is terminated, so a 255-byte segment gets a trailing 0 lace.
    /// Fails with `Error::PageOverflow` if the lacing table needs more than 255
    /// entries.
    pub fn new(
        header_type: u8,
        granule_position: u64,
        bitstream_serial: u32,
        page_sequence: u32,
        segments: Vec<Vec<u8>>,
    ) -> Result<Self> {
        let lengths: Vec<usize> = segments.iter().map(Vec::len).collect();
        let segment_table = encode_lacing(&lengths);
        let segment_count =
            u8::try_from(segment_table.len()).map_err(|_| Error::PageOverflow(segment_table.len()))?;
        Ok(OggPage {
            header: OggPageHeader {
                capture_pattern: *OGG_SIGNATURE,
                version: 0,
                header_type,
                granule_position,
                bitstream_serial,
                page_sequence,
                crc: 0,
                segment_count,
                segment_table,
            },
            segments,
        })
    }

    /// Total payload bytes across all segments
    pub fn payload_len(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    /// First segment's payload, if the page has any
    pub fn first_segment(&self) -> Option<&[u8]> {
        self.segments.first().map(Vec::as_slice)
    }

    /// Serialize the page. The stored CRC is written as-is, not recomputed.
    pub fn to_bytes(&self) -> Vec<u8> {
        let h = &self.header;
        let mut out = Vec::with_capacity(OGG_PAGE_HEADER_LEN + h.segment_table.len() + self.payload_len());
        out.extend_from_slice(&h.capture_pattern);
        out.push(h.version);
        out.push(h.header_type);
        out.extend_from_slice(&h.granule_position.to_le_bytes());
        out.extend_from_slice(&h.bitstream_serial.to_le_bytes());
        out.extend_from_slice(&h.page_sequence.to_le_bytes());
        out.extend_from_slice(&h.crc.to_le_bytes());
        out.push(h.segment_count);
        out.extend_from_slice(&h.segment_table);
        for segment in &self.segments {
            out.extend_from_slice(segment);
        }
        out
    }
}

/// Decode a lacing table into segment lengths.
///
/// Runs of 255 accumulate until the first value below 255, which is added and
/// closes the segment. A run still open at the end of the table is emitted as
/// its own segment, so the lengths always sum to the table total.
pub fn decode_lacing(table: &[u8]) -> Vec<usize> {
    let mut lengths = Vec::new();
    let mut acc = 0usize;
    for &value in table {
        acc += value as usize;
        if value < OGG_LACING_CONTINUE {
            lengths.push(acc);
            acc = 0;
        }
    }
    if acc > 0 {
        lengths.push(acc);
    }
    lengths
}

/// Build the lacing table for a sequence of complete segments
pub fn encode_lacing(lengths: &[usize]) -> Vec<u8> {
    let mut table = Vec::new();
    for &len in lengths {
        table.extend(std::iter::repeat(OGG_LACING_CONTINUE).take(len / 255));
        table.push((len % 255) as u8);
    }
    table
}

/// Sequential OGG page reader
pub struct PageReader<R> {
    inner: R,
    pages_read: u64,
}

impl<R: Read> PageReader<R> {
    pub fn new(inner: R) -> Self {
        PageReader { inner, pages_read: 0 }
    }

    /// Number of complete pages returned so far
    pub fn pages_read(&self) -> u64 {
        self.pages_read
    }

    /// Read the next page.
    ///
    /// Returns `Ok(None)` when the stream is exhausted exactly at a page
    /// boundary; a stream ending anywhere inside a page is `Error::ShortRead`.
    /// The capture pattern is not checked here.
    pub fn read_page(&mut self) -> Result<Option<OggPage>> {
        let mut fixed = [0u8; OGG_PAGE_HEADER_LEN];
        let n = read_full(&mut self.inner, &mut fixed)?;
        if n == 0 {
            debug!(pages = self.pages_read, "end of Ogg stream");
            return Ok(None);
        }
        if n < OGG_PAGE_HEADER_LEN {
            return Err(Error::ShortRead {
                expected: OGG_PAGE_HEADER_LEN,
                actual: n,
            });
        }

        let mut header = OggPageHeader::parse_fixed(&fixed);

        let mut segment_table = vec![0u8; header.segment_count as usize];
        read_exact_or_short(&mut self.inner, &mut segment_table)?;
        header.segment_table = segment_table;

        let lengths = decode_lacing(&header.segment_table);
        let mut segments = Vec::with_capacity(lengths.len());
        for len in lengths {
            let mut segment = vec![0u8; len];
            read_exact_or_short(&mut self.inner, &mut segment)?;
            segments.push(segment);
        }

        if !header.has_valid_capture_pattern() {
            warn!(
                sequence = header.page_sequence,
                pattern = ?header.capture_pattern,
                "page does not start with OggS"
            );
        }
        if header.is_continuation() {
            debug!(sequence = header.page_sequence, "page continues a packet; not stitched");
        }
        debug!(
            sequence = header.page_sequence,
            granule = header.granule_position,
            segments = segments.len(),
            "read Ogg page"
        );

        self.pages_read += 1;
        Ok(Some(OggPage { header, segments }))
    }
}
