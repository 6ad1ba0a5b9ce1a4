use anyhow::{Context, Result};
use clap::{Parser, ValueHint};
use colorsort::monkey::{DEFAULT_ITERATIONS, DEFAULT_WORKERS};
use colorsort::{run, Config, MonkeyConfig};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "colorsort",
    version,
    about = "Move every pixel to the position that encodes its own color"
)]
struct Cli {
    /// Input image, ideally 4096x4096 with every 24-bit color once
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
    /// Output PNG
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Concurrent monkey sort workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,
    /// Swap attempts per worker
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: u64,
    /// Seed for reproducible random draws
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    let config = Config {
        input: cli.input,
        output: cli.output,
        monkey: MonkeyConfig {
            workers: cli.workers,
            iterations: cli.iterations,
            seed: cli.seed,
        },
    };
    run(&config).with_context(|| format!("colorsort failed for {}", config.input.display()))?;
    Ok(())
}
