use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ColorSortError;

pub const RED_SHIFT: u32 = 16;
pub const GREEN_SHIFT: u32 = 8;
pub const BLUE_SHIFT: u32 = 0;
pub const COLOR_MASK: u32 = 0x00FF_FFFF;

/// Splits a packed color into its red, green and blue channels. Bits above
/// the low 24 are ignored.
#[inline]
pub fn channels(color: u32) -> [u8; 3] {
    [
        (color >> RED_SHIFT & 0xFF) as u8,
        (color >> GREEN_SHIFT & 0xFF) as u8,
        (color >> BLUE_SHIFT & 0xFF) as u8,
    ]
}

#[inline]
fn channel_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = i32::from(x) - i32::from(y);
            (d * d) as u32
        })
        .sum()
}

/// Squared euclidean RGB distance between two packed colors.
#[inline]
pub fn distance(a: u32, b: u32) -> u32 {
    channel_distance(channels(a), channels(b))
}

/// One source pixel: where it came from, what it looked like, and which color
/// it is currently asked to display.
///
/// The mutable half lives in atomics so optimizer workers can peek at it
/// without taking the commit lock. Every store goes through [`PixelRecord::assign`]
/// which keeps `cached_distance` in step with `assigned_color`.
#[derive(Debug)]
pub struct PixelRecord {
    original_position: u32,
    original_color: u32,
    rgb: [u8; 3],
    assigned_color: AtomicU32,
    cached_distance: AtomicU32,
}

impl PixelRecord {
    /// The pixel initially claims the color equal to its own load index, so a
    /// freshly loaded collection is already a bijection.
    pub fn new(original_position: u32, original_color: u32) -> Self {
        let original_color = original_color & COLOR_MASK;
        let rgb = channels(original_color);
        let cached = channel_distance(rgb, channels(original_position));
        PixelRecord {
            original_position,
            original_color,
            rgb,
            assigned_color: AtomicU32::new(original_position),
            cached_distance: AtomicU32::new(cached),
        }
    }

    pub fn original_position(&self) -> u32 {
        self.original_position
    }

    pub fn original_color(&self) -> u32 {
        self.original_color
    }

    pub fn red(&self) -> u8 {
        self.rgb[0]
    }

    pub fn green(&self) -> u8 {
        self.rgb[1]
    }

    pub fn blue(&self) -> u8 {
        self.rgb[2]
    }

    /// Relaxed load. Outside the commit lock the value may be stale.
    #[inline]
    pub fn assigned_color(&self) -> u32 {
        self.assigned_color.load(Ordering::Relaxed)
    }

    /// Relaxed load. Outside the commit lock the value may be stale.
    #[inline]
    pub fn cached_distance(&self) -> u32 {
        self.cached_distance.load(Ordering::Relaxed)
    }

    /// Cost of showing `candidate` instead of this pixel's original color.
    #[inline]
    pub fn distance_from(&self, candidate: u32) -> u32 {
        channel_distance(self.rgb, channels(candidate))
    }

    // Callers hold the commit lock.
    pub(crate) fn assign(&self, color: u32) {
        self.assigned_color.store(color, Ordering::Relaxed);
        self.cached_distance
            .store(self.distance_from(color), Ordering::Relaxed);
    }

    pub(crate) fn assign_mut(&mut self, color: u32) {
        *self.assigned_color.get_mut() = color;
        *self.cached_distance.get_mut() = self.distance_from(color);
    }
}

/// The whole pixel collection shared by the optimizer workers, plus the
/// single lock every swap commits under.
#[derive(Debug)]
pub struct PixelGrid {
    pixels: Vec<PixelRecord>,
    commit: Mutex<()>,
}

impl PixelGrid {
    /// Builds one record per color, in load order.
    pub fn from_colors(colors: &[u32]) -> Result<Self, ColorSortError> {
        if u32::try_from(colors.len()).is_err() {
            return Err(ColorSortError::TooManyPixels {
                count: colors.len(),
            });
        }
        let pixels = colors
            .par_iter()
            .enumerate()
            .map(|(position, &color)| PixelRecord::new(position as u32, color))
            .collect();
        Ok(PixelGrid {
            pixels,
            commit: Mutex::new(()),
        })
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[PixelRecord] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [PixelRecord] {
        &mut self.pixels
    }

    /// A worker that panicked while holding the lock cannot have left a half
    /// applied swap behind, so poisoning is ignored.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.commit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sum of every pixel's cached distance.
    pub fn total_distance(&self) -> u64 {
        self.pixels
            .par_iter()
            .map(|pixel| u64::from(pixel.cached_distance()))
            .sum()
    }

    /// True when the assigned colors are exactly `0..len` with no repeats.
    pub fn is_bijection(&self) -> bool {
        let mut assigned: Vec<u32> = self
            .pixels
            .par_iter()
            .map(PixelRecord::assigned_color)
            .collect();
        assigned.par_sort_unstable();
        assigned
            .par_iter()
            .enumerate()
            .all(|(expected, &color)| color as usize == expected)
    }

    /// True when every cached distance matches its assigned color.
    pub fn is_cache_coherent(&self) -> bool {
        self.pixels.par_iter().all(|pixel| {
            pixel.cached_distance() == distance(pixel.original_color(), pixel.assigned_color())
        })
    }
}
