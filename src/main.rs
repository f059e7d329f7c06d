//! stashkv - A Concurrent In-Memory Key-Value Store
//!
//! This is the main entry point for the stashkv shell.
//! It restores the last snapshot, starts the background expiry sweeper,
//! runs a blocking read-eval-print loop over stdin, and writes the snapshot
//! exactly once on the way out.

use anyhow::Context;
use stashkv::repl::{parse_command, Command, Session};
use stashkv::storage::{Store, Sweeper, SweeperConfig};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Shell configuration
struct Config {
    /// Where the snapshot is restored from and written to
    snapshot: PathBuf,
    /// Interval between sweep passes
    sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from(stashkv::DEFAULT_SNAPSHOT_PATH),
            sweep_interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--snapshot" | "-s" => {
                    if i + 1 < args.len() {
                        config.snapshot = PathBuf::from(&args[i + 1]);
                        i += 2;
                    } else {
                        eprintln!("Error: --snapshot requires a path");
                        std::process::exit(1);
                    }
                }
                "--sweep-interval" => {
                    if i + 1 < args.len() {
                        let seconds: f64 = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid sweep interval");
                            std::process::exit(1);
                        });
                        config.sweep_interval = Duration::from_secs_f64(seconds);
                        i += 2;
                    } else {
                        eprintln!("Error: --sweep-interval requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("stashkv version {}", stashkv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }
}

fn print_help() {
    println!(
        r#"
stashkv - A Concurrent In-Memory Key-Value Store

USAGE:
    stashkv [OPTIONS]

OPTIONS:
    -s, --snapshot <PATH>        Snapshot file to restore and write (default: backup.json)
        --sweep-interval <SECS>  Seconds between expiry sweeps (default: 1)
    -v, --version                Print version information
        --help                   Print this help message

COMMANDS:
    SET key value          Store a JSON value (bare text becomes a string)
    GET key                Read a value
    DELETE key             Remove a key
    SET_EXPIRY key secs    Expire a key `secs` seconds from now
    GET_EXPIRY key         Read a key's expiry timestamp
    EXIT                   Write the snapshot and quit

EXAMPLES:
    stashkv                               # Restore backup.json, sweep every second
    stashkv --snapshot /tmp/stash.json    # Use an alternate snapshot file
    stashkv --sweep-interval 0.1          # Sweep expired keys every 100ms
"#
    );
}

fn print_banner(config: &Config) {
    println!(
        r#"
stashkv v{} - Concurrent In-Memory Key-Value Store
──────────────────────────────────────────────────
Snapshot: {}
Type a command, or EXIT to quit.
"#,
        stashkv::VERSION,
        config.snapshot.display()
    );
}

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Print the banner
    print_banner(&config);

    // Restore the store from the last snapshot (missing file = start empty)
    let store = Arc::new(
        Store::open(config.snapshot.clone()).context("failed to restore snapshot")?,
    );
    info!(
        keys = store.len(),
        snapshot = %config.snapshot.display(),
        "store restored"
    );

    // Start the background expiry sweeper
    let _sweeper = Sweeper::start(
        Arc::clone(&store),
        SweeperConfig {
            interval: config.sweep_interval,
        },
    );

    // Run the command loop; whatever happens, back up exactly once afterwards
    let outcome = run_loop(&mut Session::new(Arc::clone(&store)));

    store
        .make_backup()
        .context("failed to write snapshot at shutdown")?;
    info!(keys = store.len(), "snapshot written");

    outcome
}

/// The blocking read-eval-print loop.
///
/// Returns when the user types EXIT or stdin reaches end of file. Malformed
/// commands are reported and skipped; only I/O failures abort the loop.
fn run_loop(session: &mut Session) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("stashkv> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            return Ok(());
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match parse_command(input) {
            Ok(Command::Exit) => return Ok(()),
            Ok(command) => println!("{}", session.execute(command)),
            Err(e) => println!("ERR {}", e),
        }
    }
}
