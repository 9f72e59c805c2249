//! lazy image inspection: identify a file from its header and only
//! decode the pixels when somebody actually asks for them

mod counting;
mod decode;
pub mod error;
pub mod format;
pub mod handle;
pub mod header;
pub mod pixels;

pub use error::{ImageError, Result};
pub use format::{ColorMode, ImageFormat};
pub use handle::LazyImage;
pub use header::HeaderInfo;
pub use pixels::PixelBuffer;
