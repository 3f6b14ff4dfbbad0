use std::io;
use std::path::PathBuf;

use clap::Parser;

use deadpos::driver::{self, DriverOptions};

/// Decides, for a chess position and an intended winner, whether that
/// player can still deliver checkmate against any defense.
#[derive(Parser, Debug)]
#[command(name = "deadpos", version, about)]
struct Cli {
    /// Run the batch expectation harness over the bundled positions file.
    #[arg(value_parser = ["test"])]
    mode: Option<String>,

    /// Suppress output when the verdict is winnable.
    #[arg(short = 'u')]
    unwinnable_only: bool,

    /// Find the shortest helpmate (disables reward shaping).
    #[arg(long)]
    min: bool,

    /// Quick analysis only; omit the deep iterative-deepening stage.
    #[arg(long)]
    quick: bool,

    /// Print a game-adjudication verdict (1/2-1/2, 1-0, 0-1) instead of
    /// analysis strings.
    #[arg(long)]
    timeout: bool,

    /// Global node budget per analyzed position.
    #[arg(long)]
    limit: Option<u64>,

    /// Expectation-coded positions file used by `test` mode.
    #[arg(long, default_value = driver::DEFAULT_TESTS_FILE)]
    tests_file: PathBuf,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    println!(
        "deadpos {} -- chess unwinnability analyzer",
        env!("CARGO_PKG_VERSION")
    );

    let options = DriverOptions {
        suppress_winnable: cli.unwinnable_only,
        shortest: cli.min,
        quick: cli.quick,
        adjudicate: cli.timeout,
        limit: cli.limit,
        tests_file: cli.tests_file,
    };

    if cli.mode.as_deref() == Some("test") {
        driver::run_test_harness(&options)
    } else {
        driver::run_stdio_loop(&options)
    }
}
