use log::{info, warn};
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use crate::error::ColorSortError;
use crate::image_io::{load, materialize, write, LoadedImage};
use crate::monkey::{monkey_sort, MonkeyConfig, MonkeyReport};
use crate::ordering::sort_by_red;
use crate::pixel::PixelGrid;

/// One pixel per 24-bit color, i.e. a 4096x4096 image.
pub const EXPECTED_PIXELS: usize = 1 << 24;

#[derive(Clone, Debug)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub monkey: MonkeyConfig,
}

/// Total distance after each phase, and what the optimizer did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub original_distance: u64,
    pub sorted_distance: u64,
    pub final_distance: u64,
    pub monkey: MonkeyReport,
}

/// Load, sort by red, monkey sort, write. Nothing is written unless every
/// earlier step succeeded.
pub fn run(config: &Config) -> Result<RunSummary, ColorSortError> {
    File::open(&config.input).map_err(|source| ColorSortError::Argument {
        path: config.input.clone(),
        source,
    })?;

    let start = Instant::now();
    let LoadedImage { width, height, mut colors } = load(&config.input)?;
    info!(
        "Loaded {}x{} image from {} in {:?}",
        width,
        height,
        config.input.display(),
        start.elapsed()
    );
    if colors.len() != EXPECTED_PIXELS {
        warn!(
            "expected one pixel per color (4096x4096), got {} pixels; \
             output will not be balanced, continuing anyway",
            colors.len()
        );
    }

    let mut grid = PixelGrid::from_colors(&colors)?;
    let original_distance = grid.total_distance();
    println!("original distance: {}", original_distance);

    let start = Instant::now();
    sort_by_red(&mut grid);
    info!("Sorted by red in {:?}", start.elapsed());
    let sorted_distance = grid.total_distance();
    println!("after sorting reds, distance: {}", sorted_distance);

    let start = Instant::now();
    info!(
        "Monkey sort: {} workers x {} iterations",
        config.monkey.workers, config.monkey.iterations
    );
    let monkey = monkey_sort(&grid, &config.monkey);
    info!(
        "Monkey sort accepted {} of {} swaps in {:?}",
        monkey.accepted,
        monkey.attempts,
        start.elapsed()
    );
    let final_distance = grid.total_distance();
    println!("after \"monkey sort\", distance: {}", final_distance);

    materialize(&grid, &mut colors);
    write(&config.output, width, height, &colors)?;
    info!("Wrote {}", config.output.display());

    Ok(RunSummary {
        original_distance,
        sorted_distance,
        final_distance,
        monkey,
    })
}
