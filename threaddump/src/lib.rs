// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! A library for parsing the textual thread dumps produced by a JVM's
//! diagnostic "Full thread dump" feature (`jstack`, `kill -3`, ...).
//!
//! A dump log may contain many consecutive dumps taken while a process was
//! being sampled. [`DumpParser`] walks such a log one line at a time and
//! hands out one [`Thread`] per call, so arbitrarily large logs can be
//! processed without buffering the whole file:
//!
//! ```
//! use threaddump::DumpParser;
//!
//! let log = "\"main\" prio=5 tid=0x1d00 nid=0xe2c runnable [0x0ce3e000]\n";
//! let mut parser = DumpParser::new(log.as_bytes());
//! while parser.next_thread() {
//!     println!("{} ({:?})", parser.thread().name, parser.thread().state);
//! }
//! ```

pub mod input;
mod parser;
mod strings;
mod thread;

pub use crate::parser::{DumpParser, Error};
pub use crate::thread::{CodeLine, Lock, Thread, ThreadDump, ThreadState};
