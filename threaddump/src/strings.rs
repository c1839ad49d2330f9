// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

/// Returns the text between the first occurrence of `start` and the next
/// occurrence of `end` after it, or `""` when either delimiter is missing.
///
/// Dump text is free-form enough that a missing delimiter is an expected
/// situation, not an error, so the empty string doubles as the "not found"
/// value throughout the parser.
pub fn string_between<'a>(text: &'a str, start: &str, end: &str) -> &'a str {
    let rest = match text.find(start) {
        Some(idx) => &text[idx + start.len()..],
        None => return "",
    };
    match rest.find(end) {
        Some(idx) => &rest[..idx],
        None => "",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_string_between() {
        assert_eq!(string_between("prio=8 tid=0x94ce800", "prio=", " "), "8");
        assert_eq!(string_between("<0x00c0092b98>", "<", ">"), "0x00c0092b98");
        assert_eq!(string_between("\"D3D Screen Updater\" daemon", "\"", "\""), "D3D Screen Updater");
    }

    #[test]
    fn test_missing_delimiters() {
        assert_eq!(string_between("prio=8", "nid=", " "), "");
        assert_eq!(string_between("nid=0xe2c", "nid=", " "), "");
        assert_eq!(string_between("", "<", ">"), "");
        // An end delimiter before the start delimiter does not count.
        assert_eq!(string_between(") (a foo", "a ", ")"), "");
    }
}
