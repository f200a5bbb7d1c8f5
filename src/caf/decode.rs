// CAF decoder
//
// Inverse of the encoder. Every known chunk type decodes into its typed
// variant; anything else is kept verbatim as `Chunk::Unknown`.

use crate::caf::chunks::{
    AudioData, AudioDescription, CafFile, ChannelDescription, ChannelLayout, Chunk, ChunkHeader, FileHeader,
    Information, PacketTable, PacketTableHeader,
};
use crate::caf::{
    varint, AUDIO_DESCRIPTION_LEN, CAF_SIGNATURE, CHUNK_AUDIO_DATA, CHUNK_AUDIO_DESCRIPTION, CHUNK_CHANNEL_LAYOUT,
    CHUNK_INFORMATION, CHUNK_MIDI, CHUNK_PACKET_TABLE,
};
use crate::utils::encoding::decode_utf8;
use crate::utils::io::ByteCursor;
use crate::{Error, Result};

fn malformed(chunk_type: [u8; 4], reason: impl Into<String>) -> Error {
    Error::MalformedChunk {
        chunk_type,
        reason: reason.into(),
    }
}

/// Fail if a chunk body has bytes left after its declared structure
fn expect_consumed(cursor: &ByteCursor<'_>, chunk_type: [u8; 4]) -> Result<()> {
    if cursor.is_empty() {
        Ok(())
    } else {
        Err(malformed(chunk_type, format!("{} trailing bytes", cursor.remaining())))
    }
}

impl FileHeader {
    pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let file_type: [u8; 4] = cursor.read_array()?;
        if &file_type != CAF_SIGNATURE {
            return Err(Error::InvalidFileType(file_type));
        }
        Ok(FileHeader {
            file_type,
            version: cursor.read_be_u16()?,
            flags: cursor.read_be_u16()?,
        })
    }
}

impl ChunkHeader {
    /// Read a chunk type and size, advancing the cursor by 12 bytes
    pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let bytes: [u8; 12] = cursor.read_array()?;
        let mut chunk_type = [0u8; 4];
        chunk_type.copy_from_slice(&bytes[0..4]);
        let mut size = [0u8; 8];
        size.copy_from_slice(&bytes[4..12]);
        Ok(ChunkHeader {
            chunk_type,
            chunk_size: i64::from_be_bytes(size),
        })
    }
}

impl AudioDescription {
    pub fn decode(body: &[u8]) -> Result<Self> {
        if body.len() != AUDIO_DESCRIPTION_LEN {
            return Err(malformed(
                CHUNK_AUDIO_DESCRIPTION,
                format!("{} bytes, expected {}", body.len(), AUDIO_DESCRIPTION_LEN),
            ));
        }
        let mut cursor = ByteCursor::new(body);
        Ok(AudioDescription {
            sample_rate: cursor.read_be_f64()?,
            format_id: cursor.read_array()?,
            format_flags: cursor.read_be_u32()?,
            bytes_per_packet: cursor.read_be_u32()?,
            frames_per_packet: cursor.read_be_u32()?,
            channels_per_frame: cursor.read_be_u32()?,
            bits_per_channel: cursor.read_be_u32()?,
        })
    }
}

impl ChannelLayout {
    pub fn decode(body: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(body);
        let tag = cursor.read_be_u32()?;
        let bitmap = cursor.read_be_u32()?;
        let count = cursor.read_be_u32()? as usize;

        let mut descriptions = Vec::with_capacity(count.min(cursor.remaining() / 20));
        for _ in 0..count {
            descriptions.push(ChannelDescription {
                label: cursor.read_be_u32()?,
                flags: cursor.read_be_u32()?,
                coordinates: [cursor.read_be_f32()?, cursor.read_be_f32()?, cursor.read_be_f32()?],
            });
        }
        expect_consumed(&cursor, CHUNK_CHANNEL_LAYOUT)?;

        Ok(ChannelLayout {
            tag,
            bitmap,
            descriptions,
        })
    }
}

impl Information {
    pub fn decode(body: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(body);
        let count = cursor.read_be_u32()? as usize;

        let mut entries = Vec::with_capacity(count.min(cursor.remaining() / 2));
        for _ in 0..count {
            let key = decode_utf8(cursor.read_nul_terminated()?)?;
            let value = decode_utf8(cursor.read_nul_terminated()?)?;
            entries.push((key, value));
        }
        expect_consumed(&cursor, CHUNK_INFORMATION)?;

        Ok(Information { entries })
    }
}

impl AudioData {
    pub fn decode(body: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(body);
        Ok(AudioData {
            edit_count: cursor.read_be_u32()?,
            data: cursor.rest().to_vec(),
        })
    }
}

impl PacketTable {
    pub fn decode(body: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(body);
        let header = PacketTableHeader {
            number_packets: cursor.read_be_i64()?,
            number_valid_frames: cursor.read_be_i64()?,
            priming_frames: cursor.read_be_i32()?,
            remainder_frames: cursor.read_be_i32()?,
        };
        if header.number_packets < 0 {
            return Err(malformed(
                CHUNK_PACKET_TABLE,
                format!("negative packet count {}", header.number_packets),
            ));
        }

        let count = header.number_packets as usize;
        let mut entries = Vec::with_capacity(count.min(cursor.remaining()));
        for _ in 0..count {
            entries.push(varint::decode(&mut cursor)?);
        }
        expect_consumed(&cursor, CHUNK_PACKET_TABLE)?;

        Ok(PacketTable { header, entries })
    }
}

impl Chunk {
    /// Decode one chunk (header and body) from the cursor.
    ///
    /// A `data` chunk with size -1 runs to the end of the buffer.
    pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let header = ChunkHeader::decode(cursor)?;
        let body = match header.chunk_size {
            -1 if header.chunk_type == CHUNK_AUDIO_DATA => cursor.rest(),
            size if size < 0 => {
                return Err(malformed(header.chunk_type, format!("negative chunk size {}", size)));
            }
            size => {
                let size = usize::try_from(size).map_err(|_| Error::InsufficientData {
                    needed: usize::MAX,
                    available: cursor.remaining(),
                })?;
                cursor.take(size)?
            }
        };

        Ok(match header.chunk_type {
            CHUNK_AUDIO_DESCRIPTION => Chunk::AudioDescription(AudioDescription::decode(body)?),
            CHUNK_CHANNEL_LAYOUT => Chunk::ChannelLayout(ChannelLayout::decode(body)?),
            CHUNK_INFORMATION => Chunk::Information(Information::decode(body)?),
            CHUNK_AUDIO_DATA => Chunk::AudioData(AudioData::decode(body)?),
            CHUNK_PACKET_TABLE => Chunk::PacketTable(PacketTable::decode(body)?),
            CHUNK_MIDI => Chunk::Midi(body.to_vec()),
            chunk_type => Chunk::Unknown {
                chunk_type,
                data: body.to_vec(),
            },
        })
    }
}

impl CafFile {
    /// Decode a complete CAF file held in memory
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        let header = FileHeader::decode(&mut cursor)?;
        let mut chunks = Vec::new();
        while !cursor.is_empty() {
            chunks.push(Chunk::decode(&mut cursor)?);
        }
        Ok(CafFile { header, chunks })
    }
}
