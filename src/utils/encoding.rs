// Text encoding utilities for CAF info strings

use encoding_rs::UTF_8;

use crate::{Error, Result};

/// Decode CAF string bytes strictly as UTF-8
pub fn decode_utf8(data: &[u8]) -> Result<String> {
    UTF_8
        .decode_without_bom_handling_and_without_replacement(data)
        .map(|text| text.into_owned())
        .ok_or_else(|| Error::InvalidString(format!("{} bytes are not valid UTF-8", data.len())))
}

/// Append `text` as a NUL-terminated UTF-8 string
pub fn write_nul_terminated(out: &mut Vec<u8>, text: &str) {
    out.extend_from_slice(text.as_bytes());
    out.push(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_utf8(b"encoder").unwrap(), "encoder");
        assert_eq!(decode_utf8("caf\u{e9}".as_bytes()).unwrap(), "caf\u{e9}");
        assert!(matches!(decode_utf8(&[0xff, 0xfe]), Err(Error::InvalidString(_))));
    }

    #[test]
    fn test_write_nul_terminated() {
        let mut out = Vec::new();
        write_nul_terminated(&mut out, "key");
        write_nul_terminated(&mut out, "");
        assert_eq!(out, b"key\0\0");
    }
}
