use log::{debug, error, info};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::counting::CountingReader;
use crate::decode;
use crate::error::{ImageError, Result};
use crate::format::{ColorMode, ImageFormat};
use crate::header::{self, HeaderInfo};
use crate::pixels::PixelBuffer;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

enum Source<R> {
    /// identified, reader parked right after the header
    Pending(CountingReader<R>),
    Loaded(PixelBuffer),
    /// decoding failed, the stream is spent so the error sticks
    Failed(String),
    Closed,
}

/// an image that has been identified but not necessarily decoded
///
/// opening only reads the header. pixels come in on the first
/// [`LazyImage::load`] and are cached from then on, at which point the
/// underlying resource is dropped since nothing else needs it
pub struct LazyImage<R> {
    name: String,
    id: u64,
    info: HeaderInfo,
    header: Vec<u8>,
    consumed: u64,
    state: Source<R>,
}

impl LazyImage<File> {
    /// open a file and identify it, leaving the pixel data on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        debug!("opening {}", name);

        let file = File::open(path).map_err(|source| {
            error!("failed to open {}: {}", name, source);
            ImageError::UnreadableResource {
                path: name.clone(),
                source,
            }
        })?;

        LazyImage::from_reader(file, name)
    }
}

impl<R: Read> LazyImage<R> {
    /// identify an arbitrary byte stream, `name` is only used in messages
    pub fn from_reader(reader: R, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let mut reader = CountingReader::new(reader);
        let (info, header) = header::identify(&mut reader, &name)?;

        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        info!(
            "identified {} as {} {} {}x{} from {} header bytes",
            name,
            info.format,
            info.mode,
            info.width,
            info.height,
            reader.count()
        );

        Ok(Self {
            name,
            id,
            info,
            header,
            consumed: 0,
            state: Source::Pending(reader),
        })
    }

    /// decode the pixel data, or hand back the cached buffer
    pub fn load(&mut self) -> Result<&PixelBuffer> {
        if matches!(self.state, Source::Pending(_)) {
            // if decoding unwinds, the handle is left failed, not closed
            let interrupted = Source::Failed("decoding was interrupted".to_string());
            if let Source::Pending(reader) = std::mem::replace(&mut self.state, interrupted) {
                self.state = self.materialize(reader);
            }
        }

        match &self.state {
            Source::Loaded(pixels) => Ok(pixels),
            Source::Failed(message) => Err(ImageError::CorruptPayload {
                path: self.name.clone(),
                message: message.clone(),
            }),
            Source::Pending(_) | Source::Closed => Err(self.closed()),
        }
    }

    fn materialize(&mut self, mut reader: CountingReader<R>) -> Source<R> {
        debug!("{}: decoding {} payload", self.name, self.info.format);

        // header bytes were already pulled off the stream, stitch them back on
        let stream = BufReader::new(Cursor::new(&self.header).chain(&mut reader));
        let result = decode::decode(stream, &self.info);
        self.consumed = reader.count();

        match result {
            Ok(pixels) => {
                info!(
                    "{}: loaded {} bytes of {} pixels ({} bytes read)",
                    self.name,
                    pixels.len(),
                    pixels.mode,
                    self.consumed
                );
                Source::Loaded(pixels)
            }
            Err(message) => {
                error!("{}: failed to decode payload: {}", self.name, message);
                Source::Failed(message)
            }
        }
    }

    /// release the resource, safe to call more than once
    pub fn close(&mut self) {
        if let Source::Pending(reader) = &self.state {
            self.consumed = reader.count();
        }
        if matches!(self.state, Source::Closed) {
            debug!("{}: already closed", self.name);
            return;
        }
        self.state = Source::Closed;
        info!("{}: closed", self.name);
    }

    /// decode if needed and write the pixels out as an rgba image
    pub fn export<P: AsRef<Path>>(&mut self, out: P) -> Result<()> {
        let out = out.as_ref();
        let rgba = self.load()?.to_rgba_image();
        rgba.save(out).map_err(|source| {
            error!("failed to write {}: {}", out.display(), source);
            ImageError::Export {
                path: out.display().to_string(),
                source,
            }
        })?;
        info!("{}: exported to {}", self.name, out.display());
        Ok(())
    }
}

impl<R> LazyImage<R> {
    fn closed(&self) -> ImageError {
        ImageError::ResourceClosed {
            path: self.name.clone(),
        }
    }

    fn ensure_open(&self) -> Result<&HeaderInfo> {
        match self.state {
            Source::Closed => Err(self.closed()),
            _ => Ok(&self.info),
        }
    }

    pub fn info(&self) -> Result<&HeaderInfo> {
        self.ensure_open()
    }

    pub fn format(&self) -> Result<ImageFormat> {
        Ok(self.ensure_open()?.format)
    }

    pub fn mode(&self) -> Result<ColorMode> {
        Ok(self.ensure_open()?.mode)
    }

    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let info = self.ensure_open()?;
        Ok((info.width, info.height))
    }

    /// one line summary, like `<GIF image mode=P size=800x450 at 0x0001>`
    pub fn describe(&self) -> Result<String> {
        let info = self.ensure_open()?;
        Ok(format!(
            "<{} image mode={} size={}x{} at {:#06x}>",
            info.format, info.mode, info.width, info.height, self.id
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, Source::Loaded(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, Source::Closed)
    }

    /// bytes pulled from the underlying resource so far
    pub fn bytes_read(&self) -> u64 {
        match &self.state {
            Source::Pending(reader) => reader.count(),
            _ => self.consumed,
        }
    }
}

impl<R> Drop for LazyImage<R> {
    fn drop(&mut self) {
        if !matches!(self.state, Source::Closed) {
            debug!("{}: released on drop", self.name);
        }
    }
}
