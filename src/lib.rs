pub mod driver;
pub mod error;
pub mod image_io;
pub mod monkey;
pub mod ordering;
pub mod pixel;

pub use driver::{run, Config, RunSummary};
pub use error::ColorSortError;
pub use monkey::{
    monkey_sort, monkey_sort_with, try_swap, MonkeyConfig, MonkeyReport, PairSource, RandomPairs,
};
pub use ordering::sort_by_red;
pub use pixel::{distance, PixelGrid, PixelRecord};
