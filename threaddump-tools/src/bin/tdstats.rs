// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! `tdstats` - per-dump table of thread counts by state.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use clap::Command;
use threaddump::{DumpParser, ThreadDump, ThreadState};

fn make_app() -> Command<'static> {
    threaddump_tools::add_common_args(
        Command::new("tdstats")
            .version(clap::crate_version!())
            .about("Counts the threads of each dump by state."),
    )
}

struct StateStats {
    dump: ThreadDump,
    counts: HashMap<ThreadState, usize>,
}

impl StateStats {
    fn new(dump: ThreadDump) -> StateStats {
        StateStats {
            dump,
            counts: HashMap::new(),
        }
    }

    fn count(&self, state: ThreadState) -> usize {
        self.counts.get(&state).copied().unwrap_or(0)
    }
}

fn main() {
    let matches = make_app().get_matches();
    threaddump_tools::init_logger(&matches);

    let reader = threaddump_tools::open_input(&matches);
    let mut parser = DumpParser::new(reader);
    // Only the header and state lines matter here.
    parser.parse_stack_frames = false;
    parser.parse_locks = false;

    let stats = all_stats(&mut parser);
    print_stats(&stats, &mut io::stdout()).unwrap();
}

fn all_stats<R: BufRead>(parser: &mut DumpParser<R>) -> Vec<StateStats> {
    let mut all: Vec<StateStats> = Vec::new();

    while parser.next_thread() {
        if parser.switched_dump() || all.is_empty() {
            all.push(StateStats::new(parser.dump().clone()));
        }
        let stats = all.last_mut().unwrap();
        *stats.counts.entry(parser.thread().state).or_insert(0) += 1;
    }

    all
}

fn print_stats<W: Write>(all: &[StateStats], out: &mut W) -> io::Result<()> {
    write!(
        out,
        "
                                   |  RUN | WAIT | TIMED_WAIT | PARK | BLOCK
-----------------------------------|------|------|------------|------|-------
"
    )?;

    for stats in all {
        writeln!(
            out,
            "{:<35} {:>5}  {:>5}        {:>5}  {:>5}   {:>5}",
            stats.dump.id,
            stats.count(ThreadState::Running),
            stats.count(ThreadState::Waiting),
            stats.count(ThreadState::TimedWaiting),
            stats.count(ThreadState::Parked),
            stats.count(ThreadState::Blocked),
        )?;
    }
    Ok(())
}
