// Opus packet extraction from audio pages

use std::io::Read;

use tracing::{debug, warn};

use crate::ogg::PageReader;
use crate::opus::{frame_size, FIRST_AUDIO_PAGE_SEQUENCE, OPUS_TAGS};
use crate::Result;

/// Packets collected from the audio pages of a stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpusPackets {
    /// Packet payloads concatenated in stream order
    pub audio: Vec<u8>,
    /// Byte length of each packet, in stream order
    pub packet_sizes: Vec<u64>,
    /// Samples per channel per packet, from the first audio page's TOC byte
    pub frame_size: u32,
}

impl OpusPackets {
    pub fn packet_count(&self) -> usize {
        self.packet_sizes.len()
    }

    /// Total samples per channel, assuming every packet has `frame_size` samples
    pub fn valid_frames(&self) -> u64 {
        u64::from(self.frame_size) * self.packet_sizes.len() as u64
    }
}

/// Read every remaining page and collect one packet per segment.
///
/// The comment header page is skipped. Packets spanning pages are not joined:
/// each decoded segment is taken as a whole packet.
pub fn extract_packets<R: Read>(reader: &mut PageReader<R>) -> Result<OpusPackets> {
    let mut packets = OpusPackets::default();

    while let Some(page) = reader.read_page()? {
        if page.first_segment().is_some_and(|s| s.starts_with(OPUS_TAGS)) {
            debug!(sequence = page.header.page_sequence, "skipping OpusTags page");
            continue;
        }

        for segment in &page.segments {
            packets.packet_sizes.push(segment.len() as u64);
            packets.audio.extend_from_slice(segment);
        }

        if page.header.page_sequence == FIRST_AUDIO_PAGE_SEQUENCE {
            if let Some(&toc) = page.first_segment().and_then(|s| s.first()) {
                packets.frame_size = frame_size(toc);
                debug!(toc, frame_size = packets.frame_size, "derived frame size");
            }
        }
    }

    if packets.frame_size == 0 && !packets.packet_sizes.is_empty() {
        warn!("no TOC byte found on the first audio page; frame size is 0");
    }

    Ok(packets)
}
