use std::fmt;

const GIF87A: &[u8] = b"GIF87a";
const GIF89A: &[u8] = b"GIF89a";
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// every signature we know, paired with the format it identifies
const SIGNATURES: [(&[u8], ImageFormat); 3] = [
    (GIF87A, ImageFormat::Gif),
    (GIF89A, ImageFormat::Gif),
    (PNG_SIGNATURE, ImageFormat::Png),
];

/// shortest recognizable signature, anything smaller can't be identified
pub const SHORTEST_SIGNATURE: usize = 6;

/// how many bytes the sniffer wants to look at
pub const LONGEST_SIGNATURE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Gif,
    Png,
}

impl ImageFormat {
    pub fn name(self) -> &'static str {
        match self {
            ImageFormat::Gif => "GIF",
            ImageFormat::Png => "PNG",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// decoded pixel representation, tags follow the usual short mode names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Palette,
    Grayscale,
    GrayscaleAlpha,
    Rgb,
    Rgba,
}

impl ColorMode {
    pub fn tag(self) -> &'static str {
        match self {
            ColorMode::Palette => "P",
            ColorMode::Grayscale => "L",
            ColorMode::GrayscaleAlpha => "LA",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
        }
    }

    /// bytes per pixel in a decoded buffer
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Palette | ColorMode::Grayscale => 1,
            ColorMode::GrayscaleAlpha => 2,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sniff {
    Match(ImageFormat),
    /// bytes ran out while still matching a signature
    Partial,
    Unknown,
}

/// match the leading bytes of a resource against the known signatures
pub fn sniff(header: &[u8]) -> Sniff {
    for (signature, format) in SIGNATURES {
        if header.starts_with(signature) {
            return Sniff::Match(format);
        }
    }

    let partial = SIGNATURES
        .iter()
        .any(|(signature, _)| header.len() < signature.len() && signature.starts_with(header));

    if partial || header.len() < SHORTEST_SIGNATURE {
        Sniff::Partial
    } else {
        Sniff::Unknown
    }
}
