use log::{debug, warn};
use std::io::Read;

use crate::format::{ColorMode, ImageFormat};
use crate::header::HeaderInfo;
use crate::pixels::PixelBuffer;

/// biggest gif canvas we're willing to allocate, same ceiling the gif
/// crate puts on its own frame buffers by default
const MAX_CANVAS_BYTES: usize = 50_000_000;

/// decode the payload behind an identified header
///
/// `reader` must yield the full stream, header included. errors come
/// back as plain messages, the caller attaches the path and kind
pub fn decode<R: Read>(reader: R, info: &HeaderInfo) -> Result<PixelBuffer, String> {
    let buffer = match info.format {
        ImageFormat::Gif => decode_gif(reader)?,
        ImageFormat::Png => decode_png(reader, info)?,
    };

    if buffer.dimensions() != (info.width, info.height) || buffer.mode != info.mode {
        return Err(format!(
            "decoded {} {}x{} but header promised {} {}x{}",
            buffer.mode, buffer.width, buffer.height, info.mode, info.width, info.height
        ));
    }
    Ok(buffer)
}

fn decode_gif<R: Read>(reader: R) -> Result<PixelBuffer, String> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);

    let mut decoder = options.read_info(reader).map_err(|e| e.to_string())?;
    let width = decoder.width() as usize;
    let height = decoder.height() as usize;
    let global_palette = decoder.global_palette().map(<[u8]>::to_vec);
    let background = decoder.bg_color().unwrap_or(0) as u8;

    let canvas_len = width
        .checked_mul(height)
        .filter(|&len| len <= MAX_CANVAS_BYTES)
        .ok_or_else(|| {
            format!(
                "logical screen {}x{} exceeds the {} byte canvas limit",
                width, height, MAX_CANVAS_BYTES
            )
        })?;

    let frame = decoder
        .read_next_frame()
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "no image frames after header".to_string())?;

    debug!(
        "gif frame {}x{} at ({}, {}), local palette: {}",
        frame.width,
        frame.height,
        frame.left,
        frame.top,
        frame.palette.is_some()
    );

    // first frame goes onto a canvas of the logical screen size
    let mut canvas = vec![background; canvas_len];
    let frame_width = frame.width as usize;
    let left = frame.left as usize;
    let top = frame.top as usize;
    for (row, line) in frame.buffer.chunks(frame_width.max(1)).enumerate() {
        let y = top + row;
        if y >= height || left >= width {
            break;
        }
        let visible = line.len().min(width - left);
        let start = y * width + left;
        canvas[start..start + visible].copy_from_slice(&line[..visible]);
    }

    let palette = frame.palette.clone().or(global_palette);
    if palette.is_none() {
        warn!("gif has neither a global nor a local palette");
    }

    Ok(PixelBuffer {
        mode: ColorMode::Palette,
        width: width as u32,
        height: height as u32,
        samples: canvas,
        palette,
        transparent: frame.transparent,
    })
}

fn decode_png<R: Read>(reader: R, info: &HeaderInfo) -> Result<PixelBuffer, String> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::STRIP_16);

    let mut png_reader = decoder.read_info().map_err(|e| e.to_string())?;
    let palette = png_reader.info().palette.as_ref().map(|p| p.to_vec());

    let mut raw = vec![0u8; png_reader.output_buffer_size()];
    let frame = png_reader.next_frame(&mut raw).map_err(|e| e.to_string())?;
    debug!(
        "png frame {}x{} {:?} at {:?} bits, {} bytes per line",
        frame.width, frame.height, frame.color_type, frame.bit_depth, frame.line_size
    );

    let depth = frame.bit_depth as u8;
    let width = frame.width as usize;
    let channels = info.mode.channels();
    let mut samples = Vec::with_capacity(width * frame.height as usize * channels);

    for line in raw.chunks(frame.line_size).take(frame.height as usize) {
        if depth < 8 {
            unpack_row(line, depth, width, info.mode == ColorMode::Grayscale, &mut samples);
        } else {
            samples.extend_from_slice(&line[..width * channels]);
        }
    }

    if info.mode == ColorMode::Palette && palette.is_none() {
        return Err("palette image without PLTE chunk".to_string());
    }

    Ok(PixelBuffer {
        mode: info.mode,
        width: frame.width,
        height: frame.height,
        samples,
        palette: if info.mode == ColorMode::Palette {
            palette
        } else {
            None
        },
        transparent: None,
    })
}

/// spread packed 1/2/4 bit samples out to one byte each
///
/// grayscale gets scaled to the full 0..=255 range, palette indices are
/// kept as they are
fn unpack_row(line: &[u8], depth: u8, width: usize, scale: bool, out: &mut Vec<u8>) {
    let per_byte = 8 / depth as usize;
    let mask = (1u8 << depth) - 1;
    let factor = 255 / mask;

    for x in 0..width {
        let byte = line[x / per_byte];
        let shift = 8 - depth as usize * (x % per_byte + 1);
        let value = (byte >> shift) & mask;
        out.push(if scale { value * factor } else { value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacks_two_bit_indices() {
        let mut out = Vec::new();
        unpack_row(&[0b00_01_10_11, 0b11_00_00_00], 2, 5, false, &mut out);
        assert_eq!(out, vec![0, 1, 2, 3, 3]);
    }

    #[test]
    fn scales_one_bit_gray() {
        let mut out = Vec::new();
        unpack_row(&[0b1010_0000], 1, 4, true, &mut out);
        assert_eq!(out, vec![255, 0, 255, 0]);
    }

    #[test]
    fn scales_four_bit_gray() {
        let mut out = Vec::new();
        unpack_row(&[0xf1], 4, 2, true, &mut out);
        assert_eq!(out, vec![255, 17]);
    }
}
