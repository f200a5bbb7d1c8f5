// CAF chunk model
//
// A CafFile is a file header plus an ordered list of chunks. Each chunk payload
// is one variant of `Chunk`; the declared chunk size is never stored, it is
// derived from the payload when the chunk is encoded.

use crate::caf::{
    CAF_SIGNATURE, CAF_VERSION, CHUNK_AUDIO_DATA, CHUNK_AUDIO_DESCRIPTION, CHUNK_CHANNEL_LAYOUT,
    CHUNK_INFORMATION, CHUNK_MIDI, CHUNK_PACKET_TABLE,
};

/// CAF file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub file_type: [u8; 4],
    pub version: u16,
    pub flags: u16,
}

impl Default for FileHeader {
    fn default() -> Self {
        FileHeader {
            file_type: *CAF_SIGNATURE,
            version: CAF_VERSION,
            flags: 0,
        }
    }
}

/// Chunk type and payload size as stored before every chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub chunk_type: [u8; 4],
    pub chunk_size: i64,
}

/// desc chunk
#[derive(Debug, Clone, PartialEq)]
pub struct AudioDescription {
    pub sample_rate: f64,
    pub format_id: [u8; 4],
    pub format_flags: u32,
    pub bytes_per_packet: u32,
    pub frames_per_packet: u32,
    pub channels_per_frame: u32,
    pub bits_per_channel: u32,
}

/// One speaker position in a channel layout
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescription {
    pub label: u32,
    pub flags: u32,
    pub coordinates: [f32; 3],
}

/// chan chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelLayout {
    pub tag: u32,
    pub bitmap: u32,
    pub descriptions: Vec<ChannelDescription>,
}

/// info chunk: ordered key/value strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Information {
    pub entries: Vec<(String, String)>,
}

impl Information {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, keeping insertion order
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Get the first value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// data chunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioData {
    pub edit_count: u32,
    pub data: Vec<u8>,
}

/// Fixed part of the pakt chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketTableHeader {
    pub number_packets: i64,
    pub number_valid_frames: i64,
    pub priming_frames: i32,
    pub remainder_frames: i32,
}

/// pakt chunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketTable {
    pub header: PacketTableHeader,
    /// Byte size of each packet
    pub entries: Vec<u64>,
}

/// A chunk payload, one variant per chunk type
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    AudioDescription(AudioDescription),
    ChannelLayout(ChannelLayout),
    Information(Information),
    AudioData(AudioData),
    PacketTable(PacketTable),
    Midi(Vec<u8>),
    Unknown { chunk_type: [u8; 4], data: Vec<u8> },
}

impl Chunk {
    /// Four-character chunk type
    pub fn chunk_type(&self) -> [u8; 4] {
        match self {
            Chunk::AudioDescription(_) => CHUNK_AUDIO_DESCRIPTION,
            Chunk::ChannelLayout(_) => CHUNK_CHANNEL_LAYOUT,
            Chunk::Information(_) => CHUNK_INFORMATION,
            Chunk::AudioData(_) => CHUNK_AUDIO_DATA,
            Chunk::PacketTable(_) => CHUNK_PACKET_TABLE,
            Chunk::Midi(_) => CHUNK_MIDI,
            Chunk::Unknown { chunk_type, .. } => *chunk_type,
        }
    }

    /// Header this chunk encodes with
    pub fn header(&self) -> ChunkHeader {
        ChunkHeader {
            chunk_type: self.chunk_type(),
            chunk_size: self.payload_len() as i64,
        }
    }
}

/// In-memory CAF file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CafFile {
    pub header: FileHeader,
    pub chunks: Vec<Chunk>,
}

impl CafFile {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        CafFile {
            header: FileHeader::default(),
            chunks,
        }
    }

    /// First chunk of the given type
    pub fn chunk(&self, chunk_type: &[u8; 4]) -> Option<&Chunk> {
        self.chunks.iter().find(|c| &c.chunk_type() == chunk_type)
    }

    pub fn audio_description(&self) -> Option<&AudioDescription> {
        self.chunks.iter().find_map(|c| match c {
            Chunk::AudioDescription(desc) => Some(desc),
            _ => None,
        })
    }

    pub fn packet_table(&self) -> Option<&PacketTable> {
        self.chunks.iter().find_map(|c| match c {
            Chunk::PacketTable(pakt) => Some(pakt),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_types() {
        assert_eq!(&Chunk::Midi(vec![]).chunk_type(), b"midi");
        assert_eq!(&Chunk::AudioData(AudioData::default()).chunk_type(), b"data");
        let unknown = Chunk::Unknown {
            chunk_type: *b"free",
            data: vec![0; 16],
        };
        assert_eq!(
            unknown.header(),
            ChunkHeader {
                chunk_type: *b"free",
                chunk_size: 16
            }
        );
    }

    #[test]
    fn test_information_lookup() {
        let info = Information::new().with_entry("encoder", "x").with_entry("title", "y");
        assert_eq!(info.get("title"), Some("y"));
        assert_eq!(info.get("artist"), None);
    }

    #[test]
    fn test_chunk_lookup() {
        let file = CafFile::new(vec![
            Chunk::Midi(vec![1]),
            Chunk::PacketTable(PacketTable::default()),
        ]);
        assert_eq!(file.header.file_type, *b"caff");
        assert_eq!(file.header.version, 1);
        assert!(file.chunk(b"midi").is_some());
        assert!(file.chunk(b"desc").is_none());
        assert!(file.audio_description().is_none());
        assert_eq!(file.packet_table(), Some(&PacketTable::default()));
    }
}
