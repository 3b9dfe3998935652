//! Minimal PNG encoder for panel screenshots (no external dependencies).
//!
//! Produces valid PNG files using uncompressed (stored) deflate blocks.
//! Larger than optimal output, but a 240×240 screenshot is still tiny and
//! the encoder stays self-contained.

/// Encode an RGBA pixel buffer as an RGB PNG.
///
/// `rgba` holds `width * height * 4` bytes in row-major RGBA order, the
/// layout of [`Controller::framebuffer`](crate::Controller). The alpha
/// channel is always opaque on this panel and is not stored.
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    let mut png = Vec::with_capacity(rgba.len() + 1024);

    // PNG signature
    png.extend_from_slice(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);

    // IHDR: 8-bit RGB, no interlace
    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, 2, 0, 0, 0]);
    write_chunk(&mut png, b"IHDR", &ihdr);

    // Scanlines: filter byte (0 = None) followed by RGB triples
    let row_bytes = width as usize * 4;
    let mut raw = Vec::with_capacity((width as usize * 3 + 1) * height as usize);
    for row in rgba.chunks_exact(row_bytes) {
        raw.push(0);
        for px in row.chunks_exact(4) {
            raw.extend_from_slice(&px[..3]);
        }
    }

    let zlib_data = zlib_stored(&raw);
    write_chunk(&mut png, b"IDAT", &zlib_data);
    write_chunk(&mut png, b"IEND", &[]);

    png
}

fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    // CRC over type + data
    let crc = crc32(&chunk_type[..], data);
    out.extend_from_slice(&crc.to_be_bytes());
}

/// Wrap raw data in zlib format using stored (uncompressed) deflate blocks.
fn zlib_stored(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 64);
    // zlib header: CMF=0x78 (deflate, window 32K), FLG=0x01 (check bits)
    out.push(0x78);
    out.push(0x01);

    // Stored deflate blocks, max 65535 bytes each
    let mut blocks = data.chunks(65535).peekable();
    if data.is_empty() {
        out.extend_from_slice(&[0x01, 0x00, 0x00, 0xFF, 0xFF]);
    }
    while let Some(block) = blocks.next() {
        let is_final = blocks.peek().is_none();
        out.push(if is_final { 0x01 } else { 0x00 }); // BFINAL + BTYPE=00
        let len = block.len() as u16;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(block);
    }

    out.extend_from_slice(&adler32(data).to_be_bytes());
    out
}

fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for &byte in data {
        a = (a + u32::from(byte)) % 65521;
        b = (b + a) % 65521;
    }
    (b << 16) | a
}

// CRC-32 (PNG/zlib)
fn crc32(chunk_type: &[u8], data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFFFFFF;
    for &b in chunk_type.iter().chain(data.iter()) {
        crc ^= u32::from(b);
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB88320;
            } else {
                crc >>= 1;
            }
        }
    }
    crc ^ 0xFFFFFFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_and_chunks() {
        let rgba = vec![0xFFu8; 2 * 2 * 4];
        let png = encode_png(2, 2, &rgba);
        assert_eq!(&png[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_ihdr_dimensions() {
        let rgba = vec![0u8; 3 * 5 * 4];
        let png = encode_png(3, 5, &rgba);
        assert_eq!(&png[16..20], &3u32.to_be_bytes());
        assert_eq!(&png[20..24], &5u32.to_be_bytes());
    }
}
