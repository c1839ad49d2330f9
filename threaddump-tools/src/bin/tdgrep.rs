// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! `tdgrep` - print the raw text of the threads matching a filter.

use std::io::{self, BufRead, Write};

use clap::{Arg, Command};
use log::error;
use regex::Regex;
use threaddump::{DumpParser, Thread};

fn make_app() -> Command<'static> {
    threaddump_tools::add_common_args(
        Command::new("tdgrep")
            .version(clap::crate_version!())
            .about("Prints every thread whose name or stacktrace matches a pattern."),
    )
    .arg(
        Arg::new("name")
            .short('n')
            .long("name")
            .takes_value(true)
            .help("Either an exact name or a regular expression like 'http.*' to match every thread whose name starts with 'http'"),
    )
    .arg(
        Arg::new("stacktrace")
            .short('s')
            .long("stacktrace")
            .takes_value(true)
            .help("A regular expression that is matched against every stacktrace method name"),
    )
}

struct Filters {
    name: Option<Regex>,
    stacktrace: Option<Regex>,
}

fn main() {
    let matches = make_app().get_matches();
    threaddump_tools::init_logger(&matches);

    let filters = match create_filters(
        matches.value_of("name").unwrap_or(""),
        matches.value_of("stacktrace").unwrap_or(""),
    ) {
        Ok(filters) => filters,
        Err(err) => {
            error!("Bad filters: {}", err);
            std::process::exit(1);
        }
    };

    let reader = threaddump_tools::open_input(&matches);
    let mut parser = DumpParser::new(reader);
    // Matches are echoed verbatim, so the raw record text has to be kept.
    parser.keep_content = true;

    grep_threads(&mut parser, &filters, &mut io::stdout()).unwrap();
}

fn create_filters(name: &str, stacktrace: &str) -> Result<Filters, regex::Error> {
    Ok(Filters {
        name: compile_if_provided(name)?,
        stacktrace: compile_if_provided(stacktrace)?,
    })
}

fn compile_if_provided(expression: &str) -> Result<Option<Regex>, regex::Error> {
    if expression.is_empty() {
        Ok(None)
    } else {
        Regex::new(expression).map(Some)
    }
}

fn grep_threads<R: BufRead, W: Write>(
    parser: &mut DumpParser<R>,
    filters: &Filters,
    out: &mut W,
) -> io::Result<()> {
    while parser.next_thread() {
        if is_matching(parser.thread(), filters) {
            writeln!(out, "{}", parser.thread().text_content)?;
        }
    }
    Ok(())
}

// The name filter takes precedence when both filters are given.
fn is_matching(thread: &Thread, filters: &Filters) -> bool {
    if let Some(name) = &filters.name {
        return name.is_match(&thread.name);
    }
    if let Some(stacktrace) = &filters.stacktrace {
        return thread
            .stack_frames
            .iter()
            .any(|line| stacktrace.is_match(&line.method_name));
    }
    false
}
