use core::fmt;

/// Error produced when redcode source text cannot be parsed.
///
/// Carries enough context to point a warrior author at the problem: the
/// 1-based line where parsing stopped and the token that was not recognized.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ParseError {
    /// 1-based source line where parsing stopped
    pub line: usize,
    /// The token that could not be recognized
    pub found: String,
}

impl ParseError {
    /// Locate a parse failure: `remaining` must be a suffix of `source`.
    pub(crate) fn locate(source: &str, remaining: &str) -> Self {
        let consumed = source.len().saturating_sub(remaining.len());
        let line = source
            .bytes()
            .take(consumed)
            .filter(|&b| b == b'\n')
            .count()
            .saturating_add(1);
        let found = remaining
            .split_whitespace()
            .next()
            .unwrap_or("end of input")
            .to_owned();
        Self { line, found }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "redcode parse error on line {}: unrecognized input near `{}`",
            self.line, self.found
        )
    }
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;

    use super::*;

    #[test]
    fn locate_reports_line_and_token() {
        let source = "MOV 0, 1\nBOGUS 1, 2\n";
        let remaining = &source[9..];
        let err = ParseError::locate(source, remaining);
        assert_eq!(err.line, 2);
        assert_eq!(err.found, "BOGUS");
        assert_eq!(
            err.to_string(),
            "redcode parse error on line 2: unrecognized input near `BOGUS`"
        );
    }

    #[test]
    fn locate_at_end_of_input() {
        let source = "";
        let err = ParseError::locate(source, source);
        assert_eq!(err.line, 1);
        assert_eq!(err.found, "end of input");
    }
}
