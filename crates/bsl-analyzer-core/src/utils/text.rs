//! Line-level helpers for BSL source text.
//!
//! BSL has one comment form (`//` to end of line) and two literal forms:
//! strings (`"..."`, with `""` as an escaped quote) and dates (`'20240101'`).
//! A string may continue on the following lines, each continuation line
//! starting with `|`.

const QUOTE: char = '"';
const DATE_QUOTE: char = '\'';

#[derive(Clone, Copy, PartialEq, Eq)]
enum Literal {
    None,
    String,
    Date,
}

impl Literal {
    fn at_line_start(line: &str) -> Self {
        // A continuation line of a multi-line string starts inside the literal.
        if line.trim_start().starts_with('|') {
            Self::String
        } else {
            Self::None
        }
    }

    /// Advances over one character; returns `true` if it is a delimiter.
    fn step(&mut self, ch: char) -> bool {
        let (next, delimiter) = match (*self, ch) {
            (Self::None, QUOTE) => (Self::String, true),
            (Self::None, DATE_QUOTE) => (Self::Date, true),
            (Self::String, QUOTE) | (Self::Date, DATE_QUOTE) => (Self::None, true),
            (state, _) => (state, false),
        };
        *self = next;
        delimiter
    }
}

/// Splits a line into code and the text after `//`, ignoring `//` inside
/// literals.
///
/// ```
/// use bsl_analyzer_core::utils::split_comment;
///
/// assert_eq!(split_comment(r#"А = "http://x"; // note"#), (r#"А = "http://x"; "#, Some(" note")));
/// assert_eq!(split_comment("Б = 1;"), ("Б = 1;", None));
/// ```
#[must_use]
pub fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut literal = Literal::at_line_start(line);
    let mut chars = line.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if literal.step(ch) {
            continue;
        }
        if literal == Literal::None && ch == '/' && matches!(chars.peek(), Some((_, '/'))) {
            return (&line[..idx], Some(&line[idx + 2..]));
        }
    }
    (line, None)
}

/// Replaces the contents of string and date literals with spaces, keeping
/// the delimiters and every character position.
#[must_use]
pub fn mask_strings(code: &str) -> String {
    let mut literal = Literal::at_line_start(code);
    code.chars()
        .map(|ch| {
            let delimiter = literal.step(ch);
            if delimiter || literal == Literal::None {
                ch
            } else {
                ' '
            }
        })
        .collect()
}

/// Converts a byte offset within `line` into a character column.
#[must_use]
pub fn char_column(line: &str, byte_idx: usize) -> usize {
    line.get(..byte_idx).map_or(0, |prefix| prefix.chars().count())
}
