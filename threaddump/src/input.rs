// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! Opening the dump input for the parser: a file when a path was given,
//! standard input otherwise.

use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

/// Opens `path` as a buffered reader, or falls back to standard input when
/// no path was given. Closing the returned reader is the caller's business;
/// the parser never does it.
///
/// Errors opening the file are returned as-is so the caller can report the
/// offending path and exit non-zero.
pub fn open(path: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}
