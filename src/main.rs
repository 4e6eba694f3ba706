use std::io;
use std::process;

use expense_ledger::config::Config;
use expense_ledger::menu::Menu;
use expense_ledger::tracker::ExpenseTracker;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_logging();

    let config = Config::from_args(std::env::args());
    let tracker = ExpenseTracker::open(&config.snapshot_path);

    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(&tracker, stdin.lock(), stdout.lock())
        .run()
        .unwrap_or_else(|err| {
            println!("could not run menu: {}", err);
            process::exit(1);
        });
}
