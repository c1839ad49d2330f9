// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! Plumbing shared by the `td*` binaries: the common flags (input file and
//! logging), logger setup and input opening. Each tool adds its own flags
//! on top and drives a [`threaddump::DumpParser`] over the opened input.

use std::fs::File;
use std::io::BufRead;
use std::path::Path;

use clap::{Arg, ArgMatches, Command};
use log::error;
use simplelog::{
    ColorChoice, ConfigBuilder, Level, LevelFilter, TermLogger, TerminalMode, WriteLogger,
};

/// Adds the flags every tool understands: `-f/--file`, `--verbose` and
/// `--log-file`.
pub fn add_common_args(cmd: Command<'static>) -> Command<'static> {
    cmd.arg(
        Arg::new("file")
            .short('f')
            .long("file")
            .takes_value(true)
            .allow_invalid_utf8(true)
            .help("The dump file to read (stdin is used per default)"),
    )
    .arg(
        Arg::new("log-file")
            .long("log-file")
            .takes_value(true)
            .allow_invalid_utf8(true)
            .help("Where to write logs to (if unspecified, stderr is used)"),
    )
    .arg(
        Arg::new("verbose")
            .long("verbose")
            .possible_values(["off", "error", "warn", "info", "debug", "trace"])
            .default_value("error")
            .takes_value(true)
            .help("Set the logging level"),
    )
}

/// Init the logger (and make trace logging less noisy).
pub fn init_logger(matches: &ArgMatches) {
    let verbosity = match matches.value_of("verbose").unwrap() {
        "off" => LevelFilter::Off,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Error,
    };

    if let Some(log_path) = matches.value_of_os("log-file") {
        let log_file = File::create(log_path).unwrap();
        let _ = WriteLogger::init(
            verbosity,
            ConfigBuilder::new()
                .set_location_level(LevelFilter::Off)
                .set_time_level(LevelFilter::Off)
                .set_thread_level(LevelFilter::Off)
                .set_target_level(LevelFilter::Off)
                .build(),
            log_file,
        );
    } else {
        let _ = TermLogger::init(
            verbosity,
            ConfigBuilder::new()
                .set_location_level(LevelFilter::Off)
                .set_time_level(LevelFilter::Off)
                .set_thread_level(LevelFilter::Off)
                .set_target_level(LevelFilter::Off)
                .set_level_color(Level::Trace, None)
                .build(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        );
    }
}

/// Opens the `-f` input (or stdin), exiting with a diagnostic naming the
/// path when the file cannot be read.
pub fn open_input(matches: &ArgMatches) -> Box<dyn BufRead> {
    let path = matches.value_of_os("file").map(Path::new);
    match threaddump::input::open(path) {
        Ok(reader) => reader,
        Err(err) => {
            let shown = path.unwrap_or_else(|| Path::new("<stdin>"));
            error!("Could not open file '{}': {}", shown.display(), err);
            std::process::exit(1);
        }
    }
}
