use std::io;
use std::path::PathBuf;

use image::ImageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColorSortError {
    #[error("cannot read input file {}: {source}", path.display())]
    Argument {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("had trouble reading {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("had trouble writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("{count} pixels do not fit in the 32-bit color index space")]
    TooManyPixels { count: usize },

    #[error("color buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch { len: usize, width: u32, height: u32 },
}
