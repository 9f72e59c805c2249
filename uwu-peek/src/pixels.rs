use image::{Rgba, RgbaImage};

use crate::format::ColorMode;

/// decoded pixels, one byte per channel, rows top to bottom
///
/// palette images keep their indices in `samples` and the colors in
/// `palette` as rgb triples. `transparent` is the index that should
/// come out fully see-through, the indices themselves are never rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub mode: ColorMode,
    pub width: u32,
    pub height: u32,
    pub samples: Vec<u8>,
    pub palette: Option<Vec<u8>>,
    pub transparent: Option<u8>,
}

impl PixelBuffer {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// number of bytes of decoded samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = self.mode.channels();
        let start = (y as usize * self.width as usize + x as usize) * channels;
        self.samples.get(start..start + channels)
    }

    /// palette entries available, 0 for direct color modes
    pub fn palette_len(&self) -> usize {
        self.palette.as_ref().map_or(0, |p| p.len() / 3)
    }

    /// expand into rgba so it can be written out by the image crate
    pub fn to_rgba_image(&self) -> RgbaImage {
        let channels = self.mode.channels();
        let palette = self.palette.as_deref().unwrap_or(&[]);

        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let start = (y as usize * self.width as usize + x as usize) * channels;
            let px = &self.samples[start..start + channels];
            match self.mode {
                ColorMode::Palette if self.transparent == Some(px[0]) => Rgba([0, 0, 0, 0]),
                ColorMode::Palette => {
                    let entry = px[0] as usize * 3;
                    match palette.get(entry..entry + 3) {
                        Some(rgb) => Rgba([rgb[0], rgb[1], rgb[2], 255]),
                        // out of range indices show up black
                        None => Rgba([0, 0, 0, 255]),
                    }
                }
                ColorMode::Grayscale => Rgba([px[0], px[0], px[0], 255]),
                ColorMode::GrayscaleAlpha => Rgba([px[0], px[0], px[0], px[1]]),
                ColorMode::Rgb => Rgba([px[0], px[1], px[2], 255]),
                ColorMode::Rgba => Rgba([px[0], px[1], px[2], px[3]]),
            }
        })
    }
}
