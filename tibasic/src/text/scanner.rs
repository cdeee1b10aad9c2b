use std::io::{self, BufRead, Lines};

/// Character that starts a comment running to the end of the line
const COMMENT_CHAR: char = '#';

/// A cleaned, non-empty source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the original input
    pub number: usize,
    pub text: String,
}

/// Strip the comment and surrounding spaces from a raw line.
///
/// Only the space character is trimmed, tabs are kept as written.
/// Returns `None` when nothing is left.
pub fn clean_line(raw: &str) -> Option<&str> {
    let code = match raw.find(COMMENT_CHAR) {
        Some(index) => &raw[..index],
        None => raw,
    };

    let trimmed = code.trim_matches(' ');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Lazily yields the cleaned lines of a source text
pub struct LineScanner<R> {
    lines: Lines<R>,
    number: usize,
}

impl<R: BufRead> LineScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            number: 0,
        }
    }
}

impl<R: BufRead> Iterator for LineScanner<R> {
    type Item = io::Result<SourceLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = match self.lines.next()? {
                Ok(raw) => raw,
                Err(e) => return Some(Err(e)),
            };
            self.number += 1;

            match clean_line(&raw) {
                Some(text) => {
                    return Some(Ok(SourceLine {
                        number: self.number,
                        text: text.to_string(),
                    }))
                }
                None => tracing::trace!(line = self.number, "skipping blank or comment-only line"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scan(input: &str) -> Vec<SourceLine> {
        LineScanner::new(Cursor::new(input))
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    fn texts(input: &str) -> Vec<String> {
        scan(input).into_iter().map(|line| line.text).collect()
    }

    #[test]
    fn test_clean_line_strips_comment() {
        assert_eq!(clean_line("Disp 1 # show one"), Some("Disp 1"));
        assert_eq!(clean_line("# only a comment"), None);
        assert_eq!(clean_line("#"), None);
    }

    #[test]
    fn test_clean_line_trims_spaces_only() {
        assert_eq!(clean_line("   ClrHome   "), Some("ClrHome"));
        assert_eq!(clean_line("\tClrHome"), Some("\tClrHome"));
        assert_eq!(clean_line("ClrHome\t "), Some("ClrHome\t"));
        assert_eq!(clean_line("     "), None);
        assert_eq!(clean_line(""), None);
    }

    #[test]
    fn test_clean_line_comment_after_code() {
        assert_eq!(clean_line("  A+B   #sum"), Some("A+B"));
    }

    #[test]
    fn test_scanner_skips_blank_and_comment_lines() {
        let input = "# header\n\nClrHome\n   \nDisp 1\n  # trailing\n";
        assert_eq!(texts(input), vec!["ClrHome", "Disp 1"]);
    }

    #[test]
    fn test_scanner_reports_original_line_numbers() {
        let lines = scan("\n# skip\nA\n\nB");
        assert_eq!(lines[0], SourceLine { number: 3, text: "A".to_string() });
        assert_eq!(lines[1], SourceLine { number: 5, text: "B".to_string() });
    }

    #[test]
    fn test_scanner_handles_crlf() {
        assert_eq!(texts("A\r\nB\r\n"), vec!["A", "B"]);
    }

    #[test]
    fn test_scanner_empty_input() {
        assert!(scan("").is_empty());
        assert!(scan("# comment only\n").is_empty());
    }

    #[test]
    fn test_scanner_invalid_utf8_is_an_error() {
        let mut scanner = LineScanner::new(Cursor::new(vec![0xFF, 0xFE, b'\n']));
        let error = scanner.next().unwrap().unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
    }
}
