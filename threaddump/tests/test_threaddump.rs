// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use threaddump::{DumpParser, Error, ThreadState};

fn get_test_dump_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("..");
    path.push("testdata");
    path.push(filename);
    path
}

fn read_test_dump() -> DumpParser<BufReader<File>> {
    let file = File::open(get_test_dump_path("threads.txt")).unwrap();
    DumpParser::new(BufReader::new(file))
}

#[test]
fn test_walk_whole_file() {
    let mut parser = read_test_dump();
    let mut names = vec![];
    let mut switches = vec![];
    while parser.next_thread() {
        names.push(parser.thread().name.clone());
        switches.push(parser.switched_dump());
    }

    assert_eq!(
        names,
        vec![
            "D3D Screen Updater",
            "AWT-Windows",
            "worker-1",
            "main",
            "AWT-Windows",
            "main"
        ]
    );
    assert_eq!(switches, vec![true, false, false, false, true, false]);
    assert_eq!(parser.last_error(), Some(&Error::EndOfStream));
    assert_eq!(parser.dump().id, "2014-12-31 11:02:04");
}

#[test]
fn test_first_dump_details() {
    let mut parser = read_test_dump();
    assert!(parser.next_thread());

    assert_eq!(parser.dump().id, "2014-12-31 11:01:49");
    assert_eq!(
        parser.dump().info_line,
        "Java HotSpot(TM) 64-Bit Server VM (24.65-b04 mixed mode)"
    );

    let thread = parser.thread();
    assert_eq!(thread.name, "D3D Screen Updater");
    assert!(thread.is_daemon);
    assert_eq!(thread.priority, 8);
    assert_eq!(thread.pid, 0xe2c);
    assert_eq!(thread.state, ThreadState::TimedWaiting);
    assert_eq!(thread.stack_frames.len(), 3);
    assert_eq!(thread.locks.len(), 2);
}

#[test]
fn test_toggles_do_not_move_boundaries() {
    let mut full = read_test_dump();
    let mut bare = read_test_dump();
    bare.parse_stack_frames = false;
    bare.parse_locks = false;

    loop {
        let more_full = full.next_thread();
        let more_bare = bare.next_thread();
        assert_eq!(more_full, more_bare);
        if !more_full {
            break;
        }
        assert_eq!(full.thread().name, bare.thread().name);
        assert_eq!(full.thread().state, bare.thread().state);
        assert_eq!(full.switched_dump(), bare.switched_dump());
        assert_eq!(full.dump(), bare.dump());
        assert!(bare.thread().stack_frames.is_empty());
        assert!(bare.thread().locks.is_empty());
    }
}
