// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! `tdlocks` - per-dump monitor report: which thread holds each lock, and
//! which threads are waiting on it.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use clap::{Arg, Command};
use threaddump::{DumpParser, Lock, Thread, ThreadDump};

fn make_app() -> Command<'static> {
    threaddump_tools::add_common_args(
        Command::new("tdlocks")
            .version(clap::crate_version!())
            .about("Reports the monitor locks held and awaited in each dump."),
    )
    .arg(
        Arg::new("min-waiting")
            .short('w')
            .long("min-waiting")
            .takes_value(true)
            .default_value("0")
            .help("The minimum amount of waiting threads for a lock to be listed"),
    )
    .arg(
        Arg::new("class")
            .short('c')
            .long("class")
            .takes_value(true)
            .help("Only report locks on objects of this class"),
    )
}

/// The lock bookkeeping of one dump, keyed by monitor address. A BTreeMap
/// keeps the report order stable across runs.
struct DumpLocks {
    dump: ThreadDump,
    locked: BTreeMap<String, LockedThreads>,
}

#[derive(Default)]
struct LockedThreads {
    holder: Option<Thread>,
    class_name: String,
    waiting: Vec<Thread>,
}

fn main() {
    let matches = make_app().get_matches();
    threaddump_tools::init_logger(&matches);

    let min_waiting = matches
        .value_of("min-waiting")
        .and_then(|w| w.parse().ok())
        .unwrap_or(0);
    let lock_class = matches.value_of("class").unwrap_or("").to_string();

    let reader = threaddump_tools::open_input(&matches);
    let mut parser = DumpParser::new(reader);
    // Lock lines are all this tool needs.
    parser.parse_stack_frames = false;

    list_locks(&mut parser, min_waiting, &lock_class, &mut io::stdout()).unwrap();
}

fn list_locks<R: BufRead, W: Write>(
    parser: &mut DumpParser<R>,
    min_waiting: usize,
    lock_class: &str,
    out: &mut W,
) -> io::Result<()> {
    let mut locks: Option<DumpLocks> = None;

    while parser.next_thread() {
        if parser.switched_dump() {
            if let Some(finished) = locks.take() {
                print_locks(&finished, min_waiting, out)?;
            }
            locks = Some(DumpLocks {
                dump: parser.dump().clone(),
                locked: BTreeMap::new(),
            });
        }

        let thread = parser.take_thread();
        if let Some(locks) = locks.as_mut() {
            for lock in &thread.locks {
                if lock_class.is_empty() || lock_class == lock.class_name {
                    remember_lock(locks, lock, &thread);
                }
            }
        }
    }

    if let Some(finished) = locks.take() {
        print_locks(&finished, min_waiting, out)?;
    }
    Ok(())
}

fn remember_lock(locks: &mut DumpLocks, lock: &Lock, thread: &Thread) {
    let entry = locks.locked.entry(lock.address.clone()).or_default();
    entry.class_name = lock.class_name.clone();
    if lock.is_held {
        entry.holder = Some(thread.clone());
    } else {
        entry.waiting.push(thread.clone());
    }
}

fn print_locks<W: Write>(locks: &DumpLocks, min_waiting: usize, out: &mut W) -> io::Result<()> {
    if locks.locked.is_empty() {
        return Ok(());
    }

    writeln!(out, "Dump: {}", locks.dump.id)?;
    for (address, lock) in &locks.locked {
        if lock.waiting.len() >= min_waiting {
            let holder = lock.holder.as_ref().map(|t| t.name.as_str()).unwrap_or("");
            writeln!(out, "\"{}\" holds {} ({})", holder, address, lock.class_name)?;
            for thread in &lock.waiting {
                writeln!(out, "- {}", thread.name)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
