use log::{debug, error};
use std::io::Read;

use crate::counting::CountingReader;
use crate::error::{ImageError, Result};
use crate::format::{ColorMode, ImageFormat, LONGEST_SIGNATURE, SHORTEST_SIGNATURE, Sniff, sniff};

/// signature + logical screen descriptor
pub const GIF_HEADER_LEN: usize = 13;

/// signature + IHDR length, type and data (crc left for the codec)
pub const PNG_HEADER_LEN: usize = 29;

/// what identification learns without touching pixel data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub format: ImageFormat,
    pub mode: ColorMode,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    /// gif interlacing lives in each frame, so it's unknown here
    pub interlaced: Option<bool>,
    pub header_len: usize,
}

/// read exactly the header and figure out what we're looking at
///
/// returns the parsed info together with the raw header bytes so the
/// decoder can be handed the full stream later without seeking
pub(crate) fn identify<R: Read>(
    reader: &mut CountingReader<R>,
    path: &str,
) -> Result<(HeaderInfo, Vec<u8>)> {
    let mut header = vec![0u8; LONGEST_SIGNATURE];
    let have = fill(reader, &mut header, path)?;
    header.truncate(have);

    let format = match sniff(&header) {
        Sniff::Match(format) => format,
        Sniff::Partial => {
            let need = if have < SHORTEST_SIGNATURE {
                SHORTEST_SIGNATURE
            } else {
                LONGEST_SIGNATURE
            };
            error!("{}: only {} header bytes available", path, have);
            return Err(ImageError::TruncatedHeader {
                path: path.to_string(),
                need,
                have,
            });
        }
        Sniff::Unknown => {
            error!("{}: no known signature matches", path);
            return Err(ImageError::UnrecognizedFormat {
                path: path.to_string(),
                reason: format!("unknown signature {:02x?}", &header[..SHORTEST_SIGNATURE]),
            });
        }
    };
    debug!("{}: sniffed {} signature", path, format);

    let need = match format {
        ImageFormat::Gif => GIF_HEADER_LEN,
        ImageFormat::Png => PNG_HEADER_LEN,
    };
    if have < need {
        header.resize(need, 0);
        let got = fill(reader, &mut header[have..], path)?;
        if have + got < need {
            error!("{}: header ends after {} bytes", path, have + got);
            return Err(ImageError::TruncatedHeader {
                path: path.to_string(),
                need,
                have: have + got,
            });
        }
    }
    header.truncate(need);

    let info = match format {
        ImageFormat::Gif => parse_gif(&header),
        ImageFormat::Png => parse_png(&header),
    }
    .map_err(|reason| {
        error!("{}: malformed {} header: {}", path, format, reason);
        ImageError::UnrecognizedFormat {
            path: path.to_string(),
            reason,
        }
    })?;

    Ok((info, header))
}

fn fill<R: Read>(reader: &mut CountingReader<R>, buf: &mut [u8], path: &str) -> Result<usize> {
    reader.fill(buf).map_err(|source| {
        error!("{}: failed reading header: {}", path, source);
        ImageError::UnreadableResource {
            path: path.to_string(),
            source,
        }
    })
}

fn parse_gif(header: &[u8]) -> std::result::Result<HeaderInfo, String> {
    let width = u16::from_le_bytes([header[6], header[7]]) as u32;
    let height = u16::from_le_bytes([header[8], header[9]]) as u32;
    let packed = header[10];

    if width == 0 || height == 0 {
        return Err(format!("zero sized logical screen {}x{}", width, height));
    }

    Ok(HeaderInfo {
        format: ImageFormat::Gif,
        mode: ColorMode::Palette,
        width,
        height,
        bit_depth: (packed & 0x07) + 1,
        interlaced: None,
        header_len: GIF_HEADER_LEN,
    })
}

fn parse_png(header: &[u8]) -> std::result::Result<HeaderInfo, String> {
    let length = u32::from_be_bytes([header[8], header[9], header[10], header[11]]);
    let chunk_type = &header[12..16];
    if chunk_type != b"IHDR" {
        return Err(format!(
            "first chunk is {:?}, expected IHDR",
            String::from_utf8_lossy(chunk_type)
        ));
    }
    if length != 13 {
        return Err(format!("IHDR length {} instead of 13", length));
    }

    let width = u32::from_be_bytes([header[16], header[17], header[18], header[19]]);
    let height = u32::from_be_bytes([header[20], header[21], header[22], header[23]]);
    let bit_depth = header[24];
    let color_type = header[25];
    let interlace = header[28];

    if width == 0 || height == 0 {
        return Err(format!("zero sized image {}x{}", width, height));
    }

    let mode = match (color_type, bit_depth) {
        (0, 1 | 2 | 4 | 8 | 16) => ColorMode::Grayscale,
        (2, 8 | 16) => ColorMode::Rgb,
        (3, 1 | 2 | 4 | 8) => ColorMode::Palette,
        (4, 8 | 16) => ColorMode::GrayscaleAlpha,
        (6, 8 | 16) => ColorMode::Rgba,
        _ => {
            return Err(format!(
                "invalid color type {} with bit depth {}",
                color_type, bit_depth
            ));
        }
    };

    let interlaced = match interlace {
        0 => false,
        1 => true,
        other => return Err(format!("unknown interlace method {}", other)),
    };

    Ok(HeaderInfo {
        format: ImageFormat::Png,
        mode,
        width,
        height,
        bit_depth,
        interlaced: Some(interlaced),
        header_len: PNG_HEADER_LEN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn identify_bytes(bytes: &[u8]) -> Result<(HeaderInfo, Vec<u8>)> {
        let mut reader = CountingReader::new(Cursor::new(bytes.to_vec()));
        identify(&mut reader, "test")
    }

    fn png_header(width: u32, height: u32, depth: u8, color: u8, interlace: u8) -> Vec<u8> {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[depth, color, 0, 0, interlace]);
        bytes
    }

    #[test]
    fn parses_gif_logical_screen() {
        let mut bytes = b"GIF89a".to_vec();
        bytes.extend_from_slice(&800u16.to_le_bytes());
        bytes.extend_from_slice(&450u16.to_le_bytes());
        bytes.extend_from_slice(&[0xf7, 0, 0]);
        bytes.extend_from_slice(&[0xaa; 64]);

        let mut reader = CountingReader::new(Cursor::new(bytes));
        let (info, header) = identify(&mut reader, "test").unwrap();
        assert_eq!(info.format, ImageFormat::Gif);
        assert_eq!(info.mode, ColorMode::Palette);
        assert_eq!((info.width, info.height), (800, 450));
        assert_eq!(info.bit_depth, 8);
        assert_eq!(header.len(), GIF_HEADER_LEN);
        assert_eq!(reader.count(), GIF_HEADER_LEN as u64);
    }

    #[test]
    fn parses_png_ihdr() {
        let (info, _) = identify_bytes(&png_header(64, 32, 8, 6, 1)).unwrap();
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!(info.mode, ColorMode::Rgba);
        assert_eq!((info.width, info.height), (64, 32));
        assert_eq!(info.interlaced, Some(true));
    }

    #[test]
    fn png_color_types_map_to_modes() {
        let cases = [
            (0, 4, ColorMode::Grayscale),
            (2, 16, ColorMode::Rgb),
            (3, 2, ColorMode::Palette),
            (4, 8, ColorMode::GrayscaleAlpha),
        ];
        for (color, depth, mode) in cases {
            let (info, _) = identify_bytes(&png_header(1, 1, depth, color, 0)).unwrap();
            assert_eq!(info.mode, mode);
        }
    }

    #[test]
    fn rejects_bad_png_combination() {
        let err = identify_bytes(&png_header(1, 1, 16, 3, 0)).unwrap_err();
        assert_eq!(err.kind(), "UnrecognizedFormat");
    }

    #[test]
    fn rejects_png_without_leading_ihdr() {
        let mut bytes = png_header(4, 4, 8, 2, 0);
        bytes[12..16].copy_from_slice(b"IDAT");
        let err = identify_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), "UnrecognizedFormat");
    }

    #[test]
    fn short_gif_header_is_truncated() {
        match identify_bytes(b"GIF89a\x20\x03") {
            Err(ImageError::TruncatedHeader { need, have, .. }) => {
                assert_eq!(need, GIF_HEADER_LEN);
                assert_eq!(have, 8);
            }
            other => panic!("expected truncated header, got {:?}", other),
        }
    }

    #[test]
    fn tiny_input_is_truncated() {
        let err = identify_bytes(b"GI").unwrap_err();
        assert_eq!(err.kind(), "TruncatedHeader");
    }

    #[test]
    fn garbage_is_unrecognized() {
        let err = identify_bytes(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind(), "UnrecognizedFormat");
    }
}
