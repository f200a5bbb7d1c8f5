// Ogg Opus to CAF conversion
//
// The whole stream is read into memory, turned into a five-chunk CAF model
// (desc, chan, info, data, pakt) and written in one go. The output file is only
// created once encoding has succeeded.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::caf::encode::packet_table_len;
use crate::caf::{
    channel_layout_tag, AudioData, AudioDescription, CafFile, ChannelLayout, Chunk, Information, PacketTable,
    PacketTableHeader, FORMAT_OPUS,
};
use crate::ogg::PageReader;
use crate::opus::{extract_packets, read_identification_header, OpusHeader, OpusPackets};
use crate::{Error, Result};

/// Encoder string ffmpeg writes into the info chunk
pub const DEFAULT_ENCODER: &str = "Lavf59.27.100";

/// Opus always decodes at 48 kHz; desc carries this regardless of the input rate
pub const OPUS_SAMPLE_RATE: f64 = 48000.0;

/// Values written into the CAF file that are not taken from the input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// info "encoder" value
    pub encoder: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            encoder: DEFAULT_ENCODER.to_string(),
        }
    }
}

impl ConvertOptions {
    /// Parse options from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// What a conversion produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub header: OpusHeader,
    pub frame_size: u32,
    pub packets: usize,
    pub audio_bytes: usize,
    pub caf_bytes: usize,
}

/// Build the CAF model for an extracted stream
pub fn build_caf_file(header: &OpusHeader, packets: &OpusPackets, options: &ConvertOptions) -> CafFile {
    let packet_count = packets.packet_count();

    let desc = AudioDescription {
        sample_rate: OPUS_SAMPLE_RATE,
        format_id: FORMAT_OPUS,
        format_flags: 0,
        bytes_per_packet: 0,
        frames_per_packet: packets.frame_size,
        channels_per_frame: u32::from(header.channels),
        bits_per_channel: 0,
    };

    let chan = ChannelLayout {
        tag: channel_layout_tag(header.channels),
        bitmap: 0,
        descriptions: Vec::new(),
    };

    let info = Information::new().with_entry("encoder", options.encoder.as_str());

    let data = AudioData {
        edit_count: 0,
        data: packets.audio.clone(),
    };

    let pakt = PacketTable {
        header: PacketTableHeader {
            number_packets: packet_count as i64,
            number_valid_frames: packets.valid_frames() as i64,
            priming_frames: 0,
            remainder_frames: 0,
        },
        entries: packets.packet_sizes.clone(),
    };
    debug!(
        packets = packet_count,
        pakt_len = packet_table_len(&packets.packet_sizes),
        "built packet table"
    );

    CafFile::new(vec![
        Chunk::AudioDescription(desc),
        Chunk::ChannelLayout(chan),
        Chunk::Information(info),
        Chunk::AudioData(data),
        Chunk::PacketTable(pakt),
    ])
}

/// Convert an Ogg Opus stream held by `reader` into CAF bytes
pub fn convert_reader<R: Read>(reader: R, options: &ConvertOptions) -> Result<(Vec<u8>, ConversionSummary)> {
    let mut pages = PageReader::new(reader);
    let header = read_identification_header(&mut pages).map_err(|e| Error::HeaderRead(Box::new(e)))?;
    let packets = extract_packets(&mut pages)?;

    let caf = build_caf_file(&header, &packets, options);
    let bytes = caf.encode();

    let summary = ConversionSummary {
        header,
        frame_size: packets.frame_size,
        packets: packets.packet_count(),
        audio_bytes: packets.audio.len(),
        caf_bytes: bytes.len(),
    };
    Ok((bytes, summary))
}

/// Convert the Ogg Opus file at `input` into a CAF file at `output`
pub fn convert(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<ConversionSummary> {
    convert_with_options(input, output, &ConvertOptions::default())
}

/// `convert` with explicit options
pub fn convert_with_options(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<ConversionSummary> {
    let input = input.as_ref();
    let output = output.as_ref();

    let file = File::open(input).map_err(|source| Error::Open {
        path: input.to_path_buf(),
        source,
    })?;
    let (bytes, summary) = convert_reader(BufReader::new(file), options)?;

    write_output(output, &bytes)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        packets = summary.packets,
        frame_size = summary.frame_size,
        bytes = summary.caf_bytes,
        "converted Ogg Opus to CAF"
    );
    Ok(summary)
}

/// Create or truncate `path` and write `bytes`, removing the file if the write fails
fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_error = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(write_error)?;
    if let Err(source) = file.write_all(bytes).and_then(|()| file.flush()) {
        drop(file);
        let _ = std::fs::remove_file(path);
        return Err(write_error(source));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caf::{CHANNEL_LAYOUT_TAG_MONO, CHANNEL_LAYOUT_TAG_STEREO};

    fn header(channels: u8) -> OpusHeader {
        OpusHeader {
            version: 1,
            channels,
            pre_skip: 0,
            input_sample_rate: 48000,
            output_gain: 0,
            channel_mapping_family: 0,
        }
    }

    fn packets() -> OpusPackets {
        OpusPackets {
            audio: vec![0u8; 400],
            packet_sizes: vec![100, 300],
            frame_size: 960,
        }
    }

    #[test]
    fn test_chunk_order_and_fields() {
        let caf = build_caf_file(&header(2), &packets(), &ConvertOptions::default());
        let types: Vec<[u8; 4]> = caf.chunks.iter().map(Chunk::chunk_type).collect();
        assert_eq!(types, vec![*b"desc", *b"chan", *b"info", *b"data", *b"pakt"]);

        let desc = caf.audio_description().unwrap();
        assert_eq!(desc.sample_rate, 48000.0);
        assert_eq!(desc.frames_per_packet, 960);
        assert_eq!(desc.channels_per_frame, 2);

        match caf.chunk(b"chan") {
            Some(Chunk::ChannelLayout(chan)) => assert_eq!(chan.tag, CHANNEL_LAYOUT_TAG_STEREO),
            other => panic!("unexpected chan chunk {:?}", other),
        }
        match caf.chunk(b"info") {
            Some(Chunk::Information(info)) => assert_eq!(info.get("encoder"), Some("Lavf59.27.100")),
            other => panic!("unexpected info chunk {:?}", other),
        }

        let pakt = caf.packet_table().unwrap();
        assert_eq!(pakt.header.number_packets, 2);
        assert_eq!(pakt.header.number_valid_frames, 1920);
        assert_eq!(pakt.entries, vec![100, 300]);
        assert_eq!(caf.chunk(b"pakt").unwrap().payload_len(), packet_table_len(&[100, 300]));
        assert_eq!(packet_table_len(&[100, 300]), 24 + 1 + 2);
    }

    #[test]
    fn test_mono_layout_for_other_counts() {
        for channels in [0u8, 1, 3, 8] {
            let caf = build_caf_file(&header(channels), &packets(), &ConvertOptions::default());
            match caf.chunk(b"chan") {
                Some(Chunk::ChannelLayout(chan)) => assert_eq!(chan.tag, CHANNEL_LAYOUT_TAG_MONO),
                other => panic!("unexpected chan chunk {:?}", other),
            }
        }
    }

    #[test]
    fn test_options_from_json() {
        let options = ConvertOptions::from_json(r#"{"encoder": "opuscaf"}"#).unwrap();
        assert_eq!(options.encoder, "opuscaf");
        assert_eq!(ConvertOptions::from_json("{}").unwrap(), ConvertOptions::default());
        assert!(matches!(ConvertOptions::from_json("{"), Err(Error::Config(_))));

        let caf = build_caf_file(&header(1), &packets(), &options);
        match caf.chunk(b"info") {
            Some(Chunk::Information(info)) => assert_eq!(info.get("encoder"), Some("opuscaf")),
            other => panic!("unexpected info chunk {:?}", other),
        }
    }

    #[test]
    fn test_desc_rate_ignores_input_rate_and_unknown_options() {
        let mut input = header(1);
        input.input_sample_rate = 44100;
        // serde ignores unknown keys, so a stale sample_rate setting has no effect
        let options = ConvertOptions::from_json(r#"{"sample_rate": 22050.0}"#).unwrap();
        let caf = build_caf_file(&input, &packets(), &options);
        assert_eq!(caf.audio_description().unwrap().sample_rate, 48000.0);
    }

    #[test]
    fn test_summary_serializes() {
        let summary = ConversionSummary {
            header: header(1),
            frame_size: 960,
            packets: 1,
            audio_bytes: 3,
            caf_bytes: 170,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["header"]["channels"], 1);
        assert_eq!(json["caf_bytes"], 170);
    }
}
