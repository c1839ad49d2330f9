// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! `tdls` - list the threads of each dump in a thread dump log.

use std::cmp::Ordering;
use std::io::{self, BufRead, Write};

use clap::{Arg, Command};
use threaddump::{DumpParser, Thread, ThreadState};

fn make_app() -> Command<'static> {
    threaddump_tools::add_common_args(
        Command::new("tdls")
            .version(clap::crate_version!())
            .about("Lists every thread of every dump in a thread dump log."),
    )
    .arg(
        Arg::new("sort")
            .short('s')
            .long("sort")
            .takes_value(true)
            .possible_values(["name", "pid", "state"])
            .help("Sort the threads of each dump by the given key (dump order per default)"),
    )
    .arg(
        Arg::new("reverse")
            .short('r')
            .long("reverse")
            .help("Reverse the sort order"),
    )
    .arg(
        Arg::new("hex")
            .long("hex")
            .help("Print PIDs in hexadecimal instead of decimal"),
    )
}

#[derive(Debug, Clone, Copy)]
enum SortKey {
    Name,
    Pid,
    State,
}

struct Conf {
    sort_by: Option<SortKey>,
    reverse: bool,
    hex_pids: bool,
}

fn main() {
    let matches = make_app().get_matches();
    threaddump_tools::init_logger(&matches);

    let conf = Conf {
        sort_by: matches.value_of("sort").map(|key| match key {
            "name" => SortKey::Name,
            "pid" => SortKey::Pid,
            "state" => SortKey::State,
            _ => unreachable!("clap validated the sort key"),
        }),
        reverse: matches.is_present("reverse"),
        hex_pids: matches.is_present("hex"),
    };

    let reader = threaddump_tools::open_input(&matches);
    let mut parser = DumpParser::new(reader);
    // Listing needs no stack data.
    parser.parse_stack_frames = false;
    parser.parse_locks = false;

    list_threads(&mut parser, &conf, &mut io::stdout()).unwrap();
}

fn list_threads<R: BufRead, W: Write>(
    parser: &mut DumpParser<R>,
    conf: &Conf,
    out: &mut W,
) -> io::Result<()> {
    let mut threads: Vec<Thread> = Vec::new();

    while parser.next_thread() {
        if parser.switched_dump() {
            print_threads(&mut threads, conf, out)?;
        }
        threads.push(parser.take_thread());
    }

    // Flush the threads of the last dump.
    print_threads(&mut threads, conf, out)
}

fn print_threads<W: Write>(threads: &mut Vec<Thread>, conf: &Conf, out: &mut W) -> io::Result<()> {
    if threads.is_empty() {
        return Ok(());
    }

    sort_threads(threads, conf);
    for thread in threads.drain(..) {
        write!(out, "{:<35} {} ", thread.name, state_letter(thread.state))?;
        if conf.hex_pids {
            writeln!(out, "0x{:<4x}", thread.pid)?;
        } else {
            writeln!(out, "{:>6}", thread.pid)?;
        }
    }
    Ok(())
}

fn sort_threads(threads: &mut [Thread], conf: &Conf) {
    match (conf.sort_by, conf.reverse) {
        (Some(key), false) => threads.sort_by(|a, b| compare(key, a, b)),
        (Some(key), true) => threads.sort_by(|a, b| compare(key, b, a)),
        // Reverse of the natural dump order.
        (None, true) => threads.reverse(),
        (None, false) => {}
    }
}

fn compare(key: SortKey, a: &Thread, b: &Thread) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Pid => a.pid.cmp(&b.pid),
        SortKey::State => a.state.cmp(&b.state),
    }
}

fn state_letter(state: ThreadState) -> &'static str {
    match state {
        ThreadState::Running => "R",
        ThreadState::Waiting => "W",
        ThreadState::TimedWaiting => "T",
        ThreadState::Parked => "P",
        ThreadState::Blocked => "B",
        ThreadState::Unknown => "U",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn thread(name: &str, pid: u64, state: ThreadState) -> Thread {
        Thread {
            name: name.to_string(),
            pid,
            state,
            ..Thread::default()
        }
    }

    fn conf(sort_by: Option<SortKey>, reverse: bool) -> Conf {
        Conf {
            sort_by,
            reverse,
            hex_pids: false,
        }
    }

    #[test]
    fn test_sort_by_name_is_case_insensitive() {
        let mut threads = vec![
            thread("c", 0, ThreadState::Unknown),
            thread("a", 0, ThreadState::Unknown),
            thread("z", 0, ThreadState::Unknown),
            thread("Z", 0, ThreadState::Unknown),
            thread("A", 0, ThreadState::Unknown),
        ];

        sort_threads(&mut threads, &conf(Some(SortKey::Name), false));
        let names: Vec<&str> = threads.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "A", "c", "z", "Z"]);

        sort_threads(&mut threads, &conf(Some(SortKey::Name), true));
        let names: Vec<&str> = threads.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["z", "Z", "c", "a", "A"]);
    }

    #[test]
    fn test_sort_by_pid() {
        let mut threads = vec![
            thread("c", 1, ThreadState::Unknown),
            thread("a", 3, ThreadState::Unknown),
            thread("z", 2, ThreadState::Unknown),
            thread("Z", 4, ThreadState::Unknown),
            thread("A", 5, ThreadState::Unknown),
        ];

        sort_threads(&mut threads, &conf(Some(SortKey::Pid), false));
        let pids: Vec<u64> = threads.iter().map(|t| t.pid).collect();
        assert_eq!(pids, vec![1, 2, 3, 4, 5]);

        sort_threads(&mut threads, &conf(Some(SortKey::Pid), true));
        let pids: Vec<u64> = threads.iter().map(|t| t.pid).collect();
        assert_eq!(pids, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_sort_by_state() {
        let mut threads = vec![
            thread("c", 0, ThreadState::Running),
            thread("a", 0, ThreadState::TimedWaiting),
            thread("z", 0, ThreadState::Blocked),
            thread("Z", 0, ThreadState::Waiting),
            thread("A", 0, ThreadState::Parked),
            thread("A", 0, ThreadState::Unknown),
        ];

        sort_threads(&mut threads, &conf(Some(SortKey::State), false));
        let states: Vec<ThreadState> = threads.iter().map(|t| t.state).collect();
        assert_eq!(
            states,
            vec![
                ThreadState::Unknown,
                ThreadState::Running,
                ThreadState::Waiting,
                ThreadState::TimedWaiting,
                ThreadState::Parked,
                ThreadState::Blocked,
            ]
        );
    }

    #[test]
    fn test_natural_order_listing() {
        let log = "
2014-12-31 11:01:49
Full thread dump Java HotSpot(TM) 64-Bit Server VM (24.65-b04 mixed mode):

\"AWT-Windows\" daemon prio=6 tid=0x0000000007e88800 nid=0x17a4 runnable [0x0000000009bef000]
   java.lang.Thread.State: BLOCKED (on object monitor)
\"AWT-Shutdown\" prio=6 tid=0x0000000007e31800 nid=0xb34 in Object.wait() [0x0000000009aef000]
   java.lang.Thread.State: WAITING (on object monitor)
\"a\" prio=1 tid=0x2 nid=0x3 waiting on condition [0x4]
   java.lang.Thread.State: WAITING (parking)
";
        let mut parser = DumpParser::new(log.as_bytes());
        parser.parse_stack_frames = false;
        parser.parse_locks = false;

        let mut out = Vec::new();
        list_threads(&mut parser, &conf(None, false), &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "AWT-Windows                         B   6052\n\
             AWT-Shutdown                        W   2868\n\
             a                                   P      3\n"
        );
    }

    #[test]
    fn test_hex_pids() {
        let log = "\"AWT-Windows\" daemon prio=6 tid=0x0000000007e88800 nid=0x17a4 runnable [0x0000000009bef000]\n";
        let mut parser = DumpParser::new(log.as_bytes());

        let mut out = Vec::new();
        let conf = Conf {
            sort_by: None,
            reverse: false,
            hex_pids: true,
        };
        list_threads(&mut parser, &conf, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "AWT-Windows                         U 0x17a4\n"
        );
    }
}
