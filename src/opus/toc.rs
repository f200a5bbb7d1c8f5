// Opus TOC byte
//
// The top five bits of the first byte of every Opus packet select one of 32
// configurations (RFC 6716, Table 2):
// - 0..=11: SILK-only, 10/20/40/60 ms
// - 12..=15: Hybrid, 10/20 ms
// - 16..=31: CELT-only, 2.5/5/10/20 ms

/// Configuration number carried in a TOC byte
pub fn toc_config(toc: u8) -> u8 {
    toc >> 3
}

/// Samples per channel at 48 kHz for the frames of a packet with this TOC byte
pub fn frame_size(toc: u8) -> u32 {
    let config = u32::from(toc_config(toc));
    match config {
        0..=11 => 960 * ((config & 3) + 1),
        12..=15 => 480 << (config & 1),
        _ => 120 << (config & 3),
    }
}
