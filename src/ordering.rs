use rayon::prelude::*;

use crate::pixel::PixelGrid;

/// Seeds the optimizer: orders the pixels by the red channel of their
/// original color, then hands each one the color equal to its new index.
///
/// Reassigning by index keeps the collection a bijection; only the order in
/// which colors are handed out changes.
pub fn sort_by_red(grid: &mut PixelGrid) {
    let pixels = grid.pixels_mut();
    pixels.par_sort_by_key(|pixel| pixel.red());
    // The grid never holds more than u32::MAX + 1 pixels.
    pixels
        .par_iter_mut()
        .enumerate()
        .for_each(|(position, pixel)| pixel.assign_mut(position as u32));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::channels;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn squared_channel_deltas(original: u32, assigned: u32) -> u64 {
        channels(original)
            .iter()
            .zip(channels(assigned).iter())
            .map(|(&a, &b)| {
                let d = i64::from(a) - i64::from(b);
                (d * d) as u64
            })
            .sum()
    }

    #[test]
    fn red_pixel_lands_last() {
        let mut grid = PixelGrid::from_colors(&[0x000000, 0x0000FF, 0x00FF00, 0xFF0000]).unwrap();
        let before = grid.total_distance();
        sort_by_red(&mut grid);

        let last = &grid.pixels()[3];
        assert_eq!(last.original_color(), 0xFF0000);
        assert_eq!(last.assigned_color(), 3);
        assert_eq!(last.original_position(), 3);

        let expected: u64 = grid
            .pixels()
            .iter()
            .map(|p| squared_channel_deltas(p.original_color(), p.assigned_color()))
            .sum();
        assert_eq!(grid.total_distance(), expected);
        // Stable sort keeps the red-free pixels in load order.
        assert_eq!(expected, 64_516 + 65_029 + 65_034);
        assert!(grid.total_distance() <= before);
    }

    #[test]
    fn red_pixel_loaded_first_moves_to_the_end() {
        let mut grid = PixelGrid::from_colors(&[0xFF0000, 0x000000, 0x0000FF, 0x00FF00]).unwrap();
        sort_by_red(&mut grid);

        let order: Vec<u32> = grid.pixels().iter().map(|p| p.original_position()).collect();
        assert_eq!(order, vec![1, 2, 3, 0]);

        let last = &grid.pixels()[3];
        assert_eq!(last.original_color(), 0xFF0000);
        assert_eq!(last.assigned_color(), 3);
        assert_eq!(grid.total_distance(), 64_516 + 65_029 + 65_034);
        assert!(grid.is_cache_coherent());
    }

    #[test]
    fn sorted_grid_stays_coherent_bijection() {
        let mut colors: Vec<u32> = (0..2048u32).map(|i| (i * 7919) & 0xFF_FFFF).collect();
        colors.shuffle(&mut StdRng::seed_from_u64(17));
        let unsorted = colors.windows(2).any(|pair| pair[0] >> 16 > pair[1] >> 16);
        assert!(unsorted);
        let mut grid = PixelGrid::from_colors(&colors).unwrap();
        sort_by_red(&mut grid);

        assert!(grid.is_bijection());
        assert!(grid.is_cache_coherent());
        assert!(grid
            .pixels()
            .windows(2)
            .all(|pair| pair[0].red() <= pair[1].red()));
        for (position, pixel) in grid.pixels().iter().enumerate() {
            assert_eq!(pixel.assigned_color(), position as u32);
        }
    }
}
