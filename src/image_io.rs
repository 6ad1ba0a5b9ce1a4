use image::{GenericImageView, ImageFormat, RgbaImage};
use std::path::Path;

use crate::error::ColorSortError;
use crate::pixel::{PixelGrid, COLOR_MASK};

pub const FULL_ALPHA: u32 = 0xFF00_0000;

/// Decoded image as packed ARGB values in row-major order.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub colors: Vec<u32>,
}

fn pack([r, g, b, a]: [u8; 4]) -> u32 {
    u32::from(a) << 24 | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b)
}

fn unpack(argb: u32) -> [u8; 4] {
    [(argb >> 16) as u8, (argb >> 8) as u8, argb as u8, (argb >> 24) as u8]
}

pub fn load(path: &Path) -> Result<LoadedImage, ColorSortError> {
    let img = image::open(path).map_err(|source| ColorSortError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let (width, height) = img.dimensions();
    let colors = img.to_rgba8().pixels().map(|p| pack(p.0)).collect();
    Ok(LoadedImage { width, height, colors })
}

/// Writes every pixel's assigned color back to its load position, fully
/// opaque.
pub fn materialize(grid: &PixelGrid, colors: &mut [u32]) {
    for pixel in grid.pixels() {
        colors[pixel.original_position() as usize] =
            FULL_ALPHA | (pixel.assigned_color() & COLOR_MASK);
    }
}

/// Encodes `colors` as a PNG, whatever the extension of `path`.
pub fn write(path: &Path, width: u32, height: u32, colors: &[u32]) -> Result<(), ColorSortError> {
    let mismatch = || ColorSortError::DimensionMismatch {
        len: colors.len(),
        width,
        height,
    };
    if colors.len() as u64 != u64::from(width) * u64::from(height) {
        return Err(mismatch());
    }
    let raw: Vec<u8> = colors.iter().flat_map(|&argb| unpack(argb)).collect();
    let img = RgbaImage::from_raw(width, height, raw).ok_or_else(mismatch)?;
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|source| ColorSortError::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::sort_by_red;

    #[test]
    fn pack_puts_alpha_on_top() {
        assert_eq!(pack([0x12, 0x34, 0x56, 0x78]), 0x7812_3456);
        assert_eq!(unpack(0x7812_3456), [0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn materialize_uses_original_positions_and_forces_alpha() {
        let source = [0x00FF_0000, 0x0000_00FF, 0x0000_FF00, 0x0000_0000];
        let mut grid = PixelGrid::from_colors(&source).unwrap();
        sort_by_red(&mut grid);

        let mut colors = source.to_vec();
        materialize(&grid, &mut colors);

        for pixel in grid.pixels() {
            let written = colors[pixel.original_position() as usize];
            assert_eq!(written, FULL_ALPHA | pixel.assigned_color());
        }
        // The only red pixel was loaded first and sorts last.
        assert_eq!(colors[0], 0xFF00_0003);
    }

    #[test]
    fn write_rejects_short_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let err = write(&dir.path().join("out.png"), 2, 2, &[0; 3]).unwrap_err();
        assert!(matches!(err, ColorSortError::DimensionMismatch { len: 3, width: 2, height: 2 }));
    }
}
