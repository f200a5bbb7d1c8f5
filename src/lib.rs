//! opuscaf - Ogg Opus to Core Audio Format conversion
//!
//! Reads an Ogg Opus stream (identification header, comment header and audio
//! pages of a single logical stream) and writes the Opus packets into a CAF
//! file laid out exactly as `ffmpeg -i in.opus -c:a copy out.caf` does.
//!
//! ```no_run
//! let summary = opuscaf::convert("voice.opus", "voice.caf")?;
//! println!("{} packets of {} samples", summary.packets, summary.frame_size);
//! # Ok::<(), opuscaf::Error>(())
//! ```

pub mod caf;
pub mod convert;
pub mod error;
pub mod ogg;
pub mod opus;
mod utils;

pub use caf::CafFile;
pub use convert::{convert, convert_reader, convert_with_options, ConversionSummary, ConvertOptions};
pub use error::{Error, HeaderError, Result};
pub use ogg::{OggPage, PageReader};
pub use opus::{OpusHeader, OpusPackets};
