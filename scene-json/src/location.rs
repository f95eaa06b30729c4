use std::fmt;
use std::sync::Arc;

/// A `(file, line, column)` triple identifying a byte offset in a parsed
/// JSON document. Lines and columns are 1-based, matching the original
/// decoder's counting convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn start(file: impl Into<Arc<str>>) -> Self {
        Self {
            file: file.into(),
            line: 1,
            column: 1,
        }
    }

    /// Advances the location past `c`, wrapping the column back to 1 on a
    /// newline instead of counting it as a column.
    pub(crate) fn advance(&mut self, c: u8) {
        if c == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
