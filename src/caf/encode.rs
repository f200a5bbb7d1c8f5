// CAF encoder
//
// Encoding is total: every model value has exactly one byte representation and
// writing into a Vec cannot fail.

use crate::caf::chunks::{
    AudioData, AudioDescription, CafFile, ChannelDescription, ChannelLayout, Chunk, ChunkHeader, FileHeader,
    Information, PacketTable,
};
use crate::caf::{varint, AUDIO_DESCRIPTION_LEN, CAF_CHUNK_HEADER_LEN, CAF_FILE_HEADER_LEN, PACKET_TABLE_HEADER_LEN};
use crate::utils::encoding::write_nul_terminated;

/// Size of one channel description
const CHANNEL_DESCRIPTION_LEN: usize = 20;

impl FileHeader {
    pub fn encode(&self) -> [u8; CAF_FILE_HEADER_LEN] {
        let mut out = [0u8; CAF_FILE_HEADER_LEN];
        out[0..4].copy_from_slice(&self.file_type);
        out[4..6].copy_from_slice(&self.version.to_be_bytes());
        out[6..8].copy_from_slice(&self.flags.to_be_bytes());
        out
    }
}

impl ChunkHeader {
    pub fn encode(&self) -> [u8; CAF_CHUNK_HEADER_LEN] {
        let mut out = [0u8; CAF_CHUNK_HEADER_LEN];
        out[0..4].copy_from_slice(&self.chunk_type);
        out[4..12].copy_from_slice(&self.chunk_size.to_be_bytes());
        out
    }
}

impl AudioDescription {
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.sample_rate.to_be_bytes());
        out.extend_from_slice(&self.format_id);
        out.extend_from_slice(&self.format_flags.to_be_bytes());
        out.extend_from_slice(&self.bytes_per_packet.to_be_bytes());
        out.extend_from_slice(&self.frames_per_packet.to_be_bytes());
        out.extend_from_slice(&self.channels_per_frame.to_be_bytes());
        out.extend_from_slice(&self.bits_per_channel.to_be_bytes());
    }
}

impl ChannelDescription {
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.label.to_be_bytes());
        out.extend_from_slice(&self.flags.to_be_bytes());
        for coordinate in self.coordinates {
            out.extend_from_slice(&coordinate.to_be_bytes());
        }
    }
}

impl ChannelLayout {
    pub fn encoded_len(&self) -> usize {
        12 + self.descriptions.len() * CHANNEL_DESCRIPTION_LEN
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.tag.to_be_bytes());
        out.extend_from_slice(&self.bitmap.to_be_bytes());
        out.extend_from_slice(&(self.descriptions.len() as u32).to_be_bytes());
        for description in &self.descriptions {
            description.write_to(out);
        }
    }
}

impl Information {
    pub fn encoded_len(&self) -> usize {
        4 + self.entries.iter().map(|(k, v)| k.len() + v.len() + 2).sum::<usize>()
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        for (key, value) in &self.entries {
            write_nul_terminated(out, key);
            write_nul_terminated(out, value);
        }
    }
}

impl AudioData {
    pub fn encoded_len(&self) -> usize {
        4 + self.data.len()
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.edit_count.to_be_bytes());
        out.extend_from_slice(&self.data);
    }
}

impl PacketTable {
    pub fn encoded_len(&self) -> usize {
        packet_table_len(&self.entries)
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        let h = &self.header;
        out.extend_from_slice(&h.number_packets.to_be_bytes());
        out.extend_from_slice(&h.number_valid_frames.to_be_bytes());
        out.extend_from_slice(&h.priming_frames.to_be_bytes());
        out.extend_from_slice(&h.remainder_frames.to_be_bytes());
        for &size in &self.entries {
            varint::encode(size, out);
        }
    }
}

/// pakt payload length for a list of packet sizes
pub fn packet_table_len(sizes: &[u64]) -> usize {
    PACKET_TABLE_HEADER_LEN + sizes.iter().map(|&s| varint::encoded_len(s)).sum::<usize>()
}

impl Chunk {
    /// Encoded payload length, excluding the 12-byte chunk header
    pub fn payload_len(&self) -> usize {
        match self {
            Chunk::AudioDescription(_) => AUDIO_DESCRIPTION_LEN,
            Chunk::ChannelLayout(chan) => chan.encoded_len(),
            Chunk::Information(info) => info.encoded_len(),
            Chunk::AudioData(data) => data.encoded_len(),
            Chunk::PacketTable(pakt) => pakt.encoded_len(),
            Chunk::Midi(data) => data.len(),
            Chunk::Unknown { data, .. } => data.len(),
        }
    }

    /// Write header and payload
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.header().encode());
        match self {
            Chunk::AudioDescription(desc) => desc.write_to(out),
            Chunk::ChannelLayout(chan) => chan.write_to(out),
            Chunk::Information(info) => info.write_to(out),
            Chunk::AudioData(data) => data.write_to(out),
            Chunk::PacketTable(pakt) => pakt.write_to(out),
            Chunk::Midi(data) => out.extend_from_slice(data),
            Chunk::Unknown { data, .. } => out.extend_from_slice(data),
        }
    }
}

impl CafFile {
    /// Total encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        CAF_FILE_HEADER_LEN
            + self
                .chunks
                .iter()
                .map(|c| CAF_CHUNK_HEADER_LEN + c.payload_len())
                .sum::<usize>()
    }

    /// Serialize the whole file
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.header.encode());
        for chunk in &self.chunks {
            chunk.write_to(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caf::chunks::PacketTableHeader;
    use pretty_assertions::assert_eq;

    fn payload(chunk: &Chunk) -> Vec<u8> {
        let mut out = Vec::new();
        chunk.write_to(&mut out);
        out.split_off(CAF_CHUNK_HEADER_LEN)
    }

    #[test]
    fn test_file_header() {
        assert_eq!(FileHeader::default().encode(), *b"caff\x00\x01\x00\x00");
    }

    #[test]
    fn test_chunk_header() {
        let header = ChunkHeader {
            chunk_type: *b"data",
            chunk_size: 0x0102,
        };
        assert_eq!(header.encode(), *b"data\x00\x00\x00\x00\x00\x00\x01\x02");
        let unknown_size = ChunkHeader {
            chunk_type: *b"data",
            chunk_size: -1,
        };
        assert_eq!(&unknown_size.encode()[4..], &[0xff; 8]);
    }

    #[test]
    fn test_audio_description_layout() {
        let chunk = Chunk::AudioDescription(AudioDescription {
            sample_rate: 48000.0,
            format_id: *b"opus",
            format_flags: 0,
            bytes_per_packet: 0,
            frames_per_packet: 960,
            channels_per_frame: 2,
            bits_per_channel: 0,
        });
        let bytes = payload(&chunk);
        assert_eq!(bytes.len(), AUDIO_DESCRIPTION_LEN);
        assert_eq!(&bytes[0..8], &[0x40, 0xe7, 0x70, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[8..12], b"opus");
        assert_eq!(&bytes[20..24], &[0, 0, 0x03, 0xc0]);
        assert_eq!(&bytes[24..28], &[0, 0, 0, 2]);
    }

    #[test]
    fn test_channel_layout_with_descriptions() {
        let chunk = Chunk::ChannelLayout(ChannelLayout {
            tag: 0,
            bitmap: 3,
            descriptions: vec![ChannelDescription {
                label: 1,
                flags: 0,
                coordinates: [1.0, 0.0, -1.0],
            }],
        });
        let bytes = payload(&chunk);
        assert_eq!(bytes.len(), chunk.payload_len());
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[8..12], &[0, 0, 0, 1]);
        assert_eq!(&bytes[20..24], &1.0f32.to_be_bytes());
        assert_eq!(&bytes[28..32], &(-1.0f32).to_be_bytes());
    }

    #[test]
    fn test_information_layout() {
        let chunk = Chunk::Information(Information::new().with_entry("encoder", "Lavf59.27.100"));
        let bytes = payload(&chunk);
        assert_eq!(chunk.payload_len(), 26);
        assert_eq!(&bytes[..4], &[0, 0, 0, 1]);
        assert_eq!(&bytes[4..], b"encoder\0Lavf59.27.100\0");
    }

    #[test]
    fn test_packet_table_layout() {
        let chunk = Chunk::PacketTable(PacketTable {
            header: PacketTableHeader {
                number_packets: 3,
                number_valid_frames: 2880,
                priming_frames: 312,
                remainder_frames: 0,
            },
            entries: vec![3, 300, 0x4000],
        });
        let bytes = payload(&chunk);
        assert_eq!(bytes.len(), 24 + 1 + 2 + 3);
        assert_eq!(bytes.len(), chunk.payload_len());
        assert_eq!(&bytes[0..8], &3i64.to_be_bytes());
        assert_eq!(&bytes[8..16], &2880i64.to_be_bytes());
        assert_eq!(&bytes[16..20], &312i32.to_be_bytes());
        assert_eq!(&bytes[24..], &[0x03, 0x82, 0x2c, 0x81, 0x80, 0x00]);
    }

    #[test]
    fn test_raw_chunks_pass_through() {
        let midi = Chunk::Midi(vec![0x4d, 0x54, 0x68, 0x64]);
        assert_eq!(payload(&midi), vec![0x4d, 0x54, 0x68, 0x64]);
        let unknown = Chunk::Unknown {
            chunk_type: *b"uuid",
            data: vec![9; 5],
        };
        let mut out = Vec::new();
        unknown.write_to(&mut out);
        assert_eq!(&out[..4], b"uuid");
        assert_eq!(&out[4..12], &5i64.to_be_bytes());
        assert_eq!(&out[12..], &[9; 5]);
    }

    #[test]
    fn test_file_encoded_len_matches_encode() {
        let file = CafFile::new(vec![
            Chunk::AudioData(AudioData {
                edit_count: 0,
                data: vec![1, 2, 3],
            }),
            Chunk::PacketTable(PacketTable {
                header: PacketTableHeader::default(),
                entries: vec![3],
            }),
        ]);
        let bytes = file.encode();
        assert_eq!(bytes.len(), file.encoded_len());
        assert_eq!(bytes.len(), 8 + 12 + 7 + 12 + 25);
    }

    #[test]
    fn test_packet_table_len() {
        assert_eq!(packet_table_len(&[]), 24);
        assert_eq!(packet_table_len(&[0x7f, 0x80, 0x3fff, 0x4000, 0x1000_0000]), 24 + 1 + 2 + 2 + 3 + 5);
    }
}
