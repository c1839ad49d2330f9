// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! The incremental dump parser: a single-pass, line-oriented state machine
//! that hands out one [`Thread`] per call.

use std::io::BufRead;

use tracing::{debug, warn};

use crate::strings::string_between;
use crate::thread::{CodeLine, Lock, Thread, ThreadDump, ThreadState};

/// Conditions reported by [`DumpParser::last_error`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The input was cleanly exhausted. Not a failure; every well-formed
    /// parse ends with it.
    #[error("End of stream")]
    EndOfStream,
    /// The underlying reader failed mid-stream.
    #[error("I/O error reading the dump")]
    IoError,
}

impl Error {
    /// Returns just the name of the error, as a more human-friendly version
    /// of an error-code for error logging.
    pub fn name(&self) -> &'static str {
        match self {
            Error::EndOfStream => "EndOfStream",
            Error::IoError => "IoError",
        }
    }
}

/// A pull-based parser for JVM thread dump logs.
///
/// Call [`next_thread`][DumpParser::next_thread] in a loop; after each call
/// that returns `true` the produced record is available through
/// [`thread`][DumpParser::thread], and [`switched_dump`][DumpParser::switched_dump]
/// tells whether that thread opened a new logical dump
/// ([`dump`][DumpParser::dump]). A `false` return means the stream is done;
/// [`last_error`][DumpParser::last_error] then distinguishes a clean
/// [`Error::EndOfStream`] from a reader failure.
///
/// # Examples
///
/// ```
/// use threaddump::DumpParser;
///
/// let log = "\
/// \"main\" prio=5 tid=0x1d00 nid=0xe2c runnable [0x0ce3e000]
///    java.lang.Thread.State: RUNNABLE
/// ";
/// let mut parser = DumpParser::new(log.as_bytes());
/// assert!(parser.next_thread());
/// assert_eq!(parser.thread().name, "main");
/// assert!(!parser.next_thread());
/// ```
#[derive(Debug)]
pub struct DumpParser<R> {
    reader: R,
    /// A thread header read as lookahead while another thread was still in
    /// progress; consumed at the start of the next call.
    cached_header: Option<String>,
    /// The last unclassified line, kept as the candidate id of a banner
    /// appearing on the following line.
    previous_line: String,
    current_dump: ThreadDump,
    /// A dump whose banner was seen while a thread was in progress; adopted
    /// once that thread has been handed out.
    pending_dump: Option<ThreadDump>,
    thread: Thread,
    switched_dump: bool,
    last_error: Option<Error>,
    /// The stream ended right after a complete thread; report it on the
    /// next call.
    pending_end: Option<Error>,
    /// Parse `at ...` lines into [`Thread::stack_frames`]. On by default;
    /// turning it off never changes thread or dump boundaries.
    pub parse_stack_frames: bool,
    /// Parse `- locked/waiting on <...>` lines into [`Thread::locks`].
    /// Same boundary guarantee as `parse_stack_frames`.
    pub parse_locks: bool,
    /// Retain the raw lines of each record in [`Thread::text_content`].
    /// Off by default.
    pub keep_content: bool,
}

impl<R: BufRead> DumpParser<R> {
    /// Creates a parser borrowing `reader` for its lifetime. The reader is
    /// never closed by the parser; that stays the caller's job.
    pub fn new(reader: R) -> DumpParser<R> {
        DumpParser {
            reader,
            cached_header: None,
            previous_line: String::new(),
            // An empty id means no dump has been established yet.
            current_dump: ThreadDump::default(),
            pending_dump: None,
            thread: Thread::default(),
            switched_dump: false,
            last_error: None,
            pending_end: None,
            parse_stack_frames: true,
            parse_locks: true,
            keep_content: false,
        }
    }

    /// Advances to the next thread record, returning whether one was
    /// produced. `false` means the stream is exhausted, which is reported
    /// through [`last_error`][DumpParser::last_error] rather than by
    /// failing.
    pub fn next_thread(&mut self) -> bool {
        if let Some(condition) = self.pending_end.take() {
            self.last_error = Some(condition);
            return false;
        }

        let mut thread = Thread::default();
        // A header line read as lookahead by the previous call starts this
        // thread immediately.
        if let Some(line) = self.cached_header.take() {
            self.keep_line(&mut thread, &line);
            parse_thread_header(&mut thread, &line);
        }

        self.switched_dump = false;
        // A banner seen while the previous thread was still in progress
        // takes visible effect only now.
        if let Some(dump) = self.pending_dump.take() {
            self.current_dump = dump;
            self.switched_dump = true;
        }

        let end_condition = loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => break Error::EndOfStream,
                Ok(_) => trim_newline(&mut line),
                Err(e) => {
                    warn!("thread dump read failed: {}", e);
                    break Error::IoError;
                }
            }

            // Classification looks at the raw line: the indentation is the
            // discriminator, so nothing gets trimmed first.
            if is_thread_header(&line) {
                if self.current_dump.id.is_empty() {
                    // Threads before any banner belong to a synthetic
                    // anonymous dump.
                    self.current_dump = ThreadDump::anonymous();
                    self.switched_dump = true;
                }
                if !thread.name.is_empty() {
                    // A new thread started with no blank line terminating
                    // the previous one. Remember the header for the next
                    // call and hand out the finished thread.
                    self.cached_header = Some(line);
                    self.thread = thread;
                    return true;
                }
                self.keep_line(&mut thread, &line);
                parse_thread_header(&mut thread, &line);
            } else if is_code_line(&line) {
                self.keep_line(&mut thread, &line);
                if self.parse_stack_frames {
                    parse_code_line(&mut thread, &line);
                }
            } else if is_lock_line(&line) {
                self.keep_line(&mut thread, &line);
                if self.parse_locks {
                    parse_lock_line(&mut thread, &line);
                }
            } else if is_state_line(&line) {
                self.keep_line(&mut thread, &line);
                parse_state_line(&mut thread, &line);
            } else if line.is_empty() {
                if !thread.name.is_empty() {
                    self.thread = thread;
                    return true;
                }
            } else if is_dump_banner(&line) {
                let dump = ThreadDump {
                    id: std::mem::take(&mut self.previous_line),
                    info_line: string_between(&line, "dump ", ":").to_string(),
                };
                if !thread.name.is_empty() {
                    // The in-progress thread completes before the dump
                    // switch becomes visible.
                    self.pending_dump = Some(dump);
                    self.thread = thread;
                    return true;
                }
                self.current_dump = dump;
                self.switched_dump = true;
            } else {
                self.previous_line = line;
            }
        };

        if thread.name.is_empty() {
            self.last_error = Some(end_condition);
            return false;
        }
        // The stream ended right after a complete thread; the condition is
        // reported on the next call.
        self.pending_end = Some(end_condition);
        self.thread = thread;
        true
    }

    /// The thread produced by the last successful
    /// [`next_thread`][DumpParser::next_thread] call.
    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    /// Takes ownership of the last produced thread, leaving a default one
    /// behind. Useful when records are collected rather than inspected.
    pub fn take_thread(&mut self) -> Thread {
        std::mem::take(&mut self.thread)
    }

    /// Whether the last produced thread belongs to a different dump than
    /// the one before it.
    pub fn switched_dump(&self) -> bool {
        self.switched_dump
    }

    /// The dump the last produced thread belongs to.
    pub fn dump(&self) -> &ThreadDump {
        &self.current_dump
    }

    /// The condition that ended parsing, once
    /// [`next_thread`][DumpParser::next_thread] has returned `false`.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    fn keep_line(&self, thread: &mut Thread, line: &str) {
        if !self.keep_content {
            return;
        }
        if !thread.text_content.is_empty() {
            thread.text_content.push('\n');
        }
        thread.text_content.push_str(line);
    }
}

fn trim_newline(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

fn is_thread_header(line: &str) -> bool {
    line.starts_with('"')
}

fn is_code_line(line: &str) -> bool {
    line.starts_with("\tat")
}

fn is_lock_line(line: &str) -> bool {
    line.starts_with("\t-")
}

fn is_state_line(line: &str) -> bool {
    line.starts_with("   java.lang.Thread.State:")
}

fn is_dump_banner(line: &str) -> bool {
    line.starts_with("Full thread dump")
}

fn parse_thread_header(thread: &mut Thread, line: &str) {
    // Example:
    // "D3D Screen Updater" daemon prio=8 tid=0x094ce800 nid=0xe2c in Object.wait() [0x0ce3e000]
    thread.name = string_between(line, "\"", "\"").to_string();
    thread.native_id = string_between(line, "nid=", " ").to_string();
    thread.vm_id = string_between(line, "tid=", " ").to_string();
    thread.pid = parse_hex_id(&thread.native_id);
    thread.is_daemon = line.contains("daemon");
    thread.priority = string_between(line, "prio=", " ").parse().unwrap_or(0);
    thread.state = ThreadState::Unknown;
    thread.stack_frames = Vec::new();
    thread.locks = Vec::new();
}

/// Decodes an id token like `0xe2c` (the `0x` is optional) to a number,
/// falling back to 0 like every other field-parse failure.
fn parse_hex_id(token: &str) -> u64 {
    let digits = token.strip_prefix("0x").unwrap_or(token);
    u64::from_str_radix(digits, 16).unwrap_or(0)
}

fn parse_code_line(thread: &mut Thread, line: &str) {
    // Examples:
    //	at java.util.concurrent.locks.LockSupport.park(LockSupport.java:186)
    //	at java.lang.Object.wait(Native Method)
    let mut code_line = CodeLine {
        method_name: string_between(line, "at ", "(").to_string(),
        is_native: line.contains("Native Method"),
        ..CodeLine::default()
    };
    if !code_line.is_native {
        code_line.file_name = string_between(line, "(", ":").to_string();
        code_line.line_number = string_between(line, ":", ")").parse().unwrap_or(0);
    }
    thread.stack_frames.push(code_line);
}

fn parse_lock_line(thread: &mut Thread, line: &str) {
    // Examples:
    //	- waiting on <0x00000000c0092b98> (a java.lang.Object)
    //	- locked <0x00000000c0092b98> (a java.lang.Object)
    thread.locks.push(Lock {
        class_name: string_between(line, "a ", ")").to_string(),
        address: string_between(line, "<", ">").to_string(),
        is_held: line.contains("locked <"),
    });
}

fn parse_state_line(thread: &mut Thread, line: &str) {
    // TIMED_WAITING has to be checked before the plain WAITING variants,
    // which are substrings of it.
    if line.contains("RUNNABLE") {
        thread.state = ThreadState::Running;
    } else if line.contains("TIMED_WAITING (on object monitor)") {
        thread.state = ThreadState::TimedWaiting;
    } else if line.contains("WAITING (on object monitor)") {
        thread.state = ThreadState::Waiting;
    } else if line.contains("WAITING (parking)") {
        thread.state = ThreadState::Parked;
    } else if line.contains("BLOCKED (on object monitor)") {
        thread.state = ThreadState::Blocked;
    } else {
        debug!("unrecognized thread state: {}", line.trim());
    }
}
