// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! The structured records produced by the parser: dumps, threads, stack
//! frames and monitor locks.

/// One logical dump within a multi-dump log.
///
/// A dump normally announces itself with a `Full thread dump ...:` banner
/// preceded by a timestamp line. When thread headers appear before any
/// banner was seen, the parser synthesizes an "anonymous" dump with
/// [`ThreadDump::ANONYMOUS_ID`] as its id.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ThreadDump {
    /// Opaque identifier, typically the timestamp line preceding the banner.
    pub id: String,
    /// Free-text description from the banner, e.g. the VM name and version.
    pub info_line: String,
}

impl ThreadDump {
    /// The placeholder id used when threads appear before any banner line.
    pub const ANONYMOUS_ID: &'static str = "0";

    pub(crate) fn anonymous() -> ThreadDump {
        ThreadDump {
            id: ThreadDump::ANONYMOUS_ID.to_string(),
            info_line: String::new(),
        }
    }
}

/// The state a thread reported on its `java.lang.Thread.State:` line.
///
/// The declaration order doubles as the sort order, so thread lists can be
/// ordered from "doing work" to "stuck".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThreadState {
    /// No state line was seen, or its token wasn't recognized.
    #[default]
    Unknown,
    Running,
    Waiting,
    TimedWaiting,
    Parked,
    Blocked,
}

/// One parsed thread record.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Thread {
    /// The thread's name. An empty name means "no thread parsed yet"; the
    /// parser never hands out a nameless thread.
    pub name: String,
    /// The OS-level thread id, as the literal token from the dump
    /// (e.g. `"0xe2c"`).
    pub native_id: String,
    /// The VM-level thread id, also a literal token.
    pub vm_id: String,
    /// [`Thread::native_id`] decoded as a hex number, 0 when undecodable.
    pub pid: u64,
    pub is_daemon: bool,
    /// Thread priority, 0 when missing or unparsable.
    pub priority: i32,
    pub state: ThreadState,
    pub stack_frames: Vec<CodeLine>,
    pub locks: Vec<Lock>,
    /// The raw lines of this record, newline-joined. Only populated when
    /// the parser's `keep_content` toggle is on, so tools that echo
    /// matching threads verbatim don't pay for it otherwise.
    pub text_content: String,
}

/// One call site within a thread's captured call stack.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CodeLine {
    /// Fully qualified method name, e.g. `java.lang.Object.wait`.
    pub method_name: String,
    pub is_native: bool,
    /// Source file name, empty for native frames.
    pub file_name: String,
    /// Source line number, 0 for native frames or when unparsable.
    pub line_number: u32,
}

/// One monitor reference attached to a thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Lock {
    pub class_name: String,
    /// The monitor's address, as the literal token between the angle
    /// brackets (e.g. `"0x00000000c0092b98"`).
    pub address: String,
    /// `true` for a `locked <...>` line, `false` for `waiting on <...>`.
    pub is_held: bool,
}
