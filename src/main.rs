// src/main.rs

mod app_logic;
mod cli;
mod core;
mod session;

use crate::app_logic::view_state::APP_TITLE;
use crate::core::{
    CoreExporter, CoreFileSystemScanner, JsonFilePreferenceStore, Preferences, ScannerConfig,
    TikTokenCounter,
};
use clap::Parser;
use session::Session;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::io::{self, Write};

fn init_logging(verbose: u8) {
    let config = ConfigBuilder::new()
        .set_time_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .build();
    if let Err(e) = TermLogger::init(
        cli::level_filter(verbose),
        config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger: {e}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::Cli::parse();
    init_logging(args.verbose);
    log::debug!("Main: Starting {APP_TITLE} with {args:?}");

    let store = match &args.state_dir {
        Some(dir) => JsonFilePreferenceStore::open_in_dir(dir)?,
        None => JsonFilePreferenceStore::open_default(APP_TITLE)?,
    };
    log::info!("Main: Using preferences at {:?}", store.file_path());

    let mut scanner_config = ScannerConfig::default();
    if let Some(max_file_size) = args.max_file_size {
        scanner_config.max_file_size = max_file_size;
    }
    let scanner = CoreFileSystemScanner::new(scanner_config, Box::new(TikTokenCounter::new()));

    let mut session = Session::new(
        Preferences::new(Box::new(store)),
        Box::new(scanner),
        Box::new(CoreExporter),
    );
    session.restore();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    session.run(args.command, &mut out)?;
    out.flush()?;
    Ok(())
}
