//! Minimal AT response line handling
//!
//! Just enough of the AT response grammar for the power-on handshake:
//! pulling the first complete line out of an accumulation buffer and
//! splitting a response line into comma-separated tokens.

/// Extract the first complete, non-empty line from a receive buffer.
///
/// A line is complete once it is terminated by CR or LF. Leading line
/// terminators (from a previous line, or an echo artifact) are
/// skipped. Returns `None` while no terminated non-empty line exists
/// yet, so callers can keep accumulating.
pub fn first_line(buf: &[u8]) -> Option<&str> {
    let mut start = 0;
    while start < buf.len() {
        let end = buf[start..]
            .iter()
            .position(|&b| b == b'\r' || b == b'\n')
            .map(|pos| start + pos)?;
        if end > start {
            return std::str::from_utf8(&buf[start..end]).ok();
        }
        start = end + 1;
    }
    None
}

/// Tokenize one AT response line.
///
/// Strips an optional `PREFIX:` lead-in up to the first colon, then
/// splits the remainder on commas, trimming whitespace and dropping
/// empty tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    let body = match line.find(':') {
        Some(pos) => &line[pos + 1..],
        None => line,
    };

    body.split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_waits_for_terminator() {
        assert_eq!(first_line(b"+CPAS"), None);
        assert_eq!(first_line(b"+CPAS: 0\r\n"), Some("+CPAS: 0"));
    }

    #[test]
    fn test_first_line_skips_leading_terminators() {
        assert_eq!(first_line(b"\r\n+CPAS: 3\r\n"), Some("+CPAS: 3"));
        assert_eq!(first_line(b"\r\n\r\n"), None);
    }

    #[test]
    fn test_tokenize_strips_prefix() {
        assert_eq!(tokenize("+CPAS: 0"), vec!["0"]);
    }

    #[test]
    fn test_tokenize_splits_on_commas() {
        assert_eq!(tokenize("+CREG: 0,1"), vec!["0", "1"]);
    }

    #[test]
    fn test_tokenize_drops_empty_tokens() {
        assert_eq!(tokenize("+CPAS: ,,"), Vec::<&str>::new());
    }

    #[test]
    fn test_tokenize_without_prefix() {
        assert_eq!(tokenize("OK"), vec!["OK"]);
    }
}
