//! Language-agnostic lexer for C-like source text.
//!
//! Keywords become their upper-cased spelling, identifiers `ID`, numbers
//! `NUM`, string and char literals `STR`; every other character is its own
//! token. `//` and `/* */` comments and `#` directives at line start are
//! skipped. Regions use zero-based rows and byte columns, end column exclusive.

use crate::error::FingerprintError;
use crate::file::TokenizedFile;
use crate::region::Region;

pub const TOKEN_IDENT: &str = "ID";
pub const TOKEN_NUMBER: &str = "NUM";
pub const TOKEN_STRING: &str = "STR";

fn is_keyword(ident: &str) -> bool {
    matches!(
        ident,
        "if" | "else"
            | "elif"
            | "then"
            | "for"
            | "foreach"
            | "while"
            | "do"
            | "loop"
            | "switch"
            | "match"
            | "case"
            | "default"
            | "break"
            | "continue"
            | "return"
            | "yield"
            | "goto"
            | "try"
            | "catch"
            | "except"
            | "finally"
            | "throw"
            | "raise"
            | "fn"
            | "func"
            | "function"
            | "def"
            | "lambda"
            | "class"
            | "struct"
            | "enum"
            | "union"
            | "interface"
            | "impl"
            | "trait"
            | "const"
            | "let"
            | "var"
            | "static"
            | "public"
            | "private"
            | "protected"
            | "async"
            | "await"
            | "new"
            | "delete"
            | "import"
            | "package"
            | "in"
            | "not"
            | "and"
            | "or"
            | "begin"
            | "end"
            | "program"
            | "procedure"
    )
}

/// Byte cursor that keeps track of the zero-based row and the row's start.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    row: u32,
    row_start: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn col(&self) -> u32 {
        (self.pos - self.row_start) as u32
    }

    fn bump(&mut self) {
        if self.bytes[self.pos] == b'\n' {
            self.row = self.row.saturating_add(1);
            self.row_start = self.pos + 1;
        }
        self.pos += 1;
    }

    fn skip_line(&mut self) {
        while self.peek(0).is_some_and(|b| b != b'\n') {
            self.pos += 1;
        }
    }
}

/// Tokenizes `text` into a [`TokenizedFile`] labelled `path`.
pub fn tokenize(path: impl Into<String>, text: &str) -> Result<TokenizedFile, FingerprintError> {
    let mut cur = Cursor {
        bytes: text.as_bytes(),
        pos: 0,
        row: 0,
        row_start: 0,
    };
    let mut at_line_start = true;
    let mut tokens: Vec<String> = Vec::new();
    let mut regions: Vec<Region> = Vec::new();

    while let Some(b) = cur.peek(0) {
        if b == b'\n' {
            cur.bump();
            at_line_start = true;
            continue;
        }
        if b.is_ascii_whitespace() {
            cur.bump();
            continue;
        }

        let was_at_line_start = at_line_start;
        at_line_start = false;

        if b == b'/' && cur.peek(1) == Some(b'/') {
            cur.skip_line();
            continue;
        }
        if b == b'/' && cur.peek(1) == Some(b'*') {
            cur.pos += 2;
            while let Some(c) = cur.peek(0) {
                if c == b'*' && cur.peek(1) == Some(b'/') {
                    cur.pos += 2;
                    break;
                }
                cur.bump();
            }
            continue;
        }
        if b == b'#' && was_at_line_start {
            cur.skip_line();
            continue;
        }

        let (start_row, start_col) = (cur.row, cur.col());
        let start = cur.pos;

        let token = if b == b'"' || b == b'\'' {
            cur.pos += 1;
            while let Some(c) = cur.peek(0) {
                if c == b'\\' && cur.peek(1).is_some() {
                    cur.pos += 1;
                    cur.bump();
                    continue;
                }
                cur.bump();
                if c == b {
                    break;
                }
            }
            TOKEN_STRING.to_string()
        } else if b.is_ascii_alphabetic() || b == b'_' {
            while cur
                .peek(0)
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
            {
                cur.pos += 1;
            }
            let ident = &text[start..cur.pos];
            if is_keyword(ident) {
                ident.to_ascii_uppercase()
            } else {
                TOKEN_IDENT.to_string()
            }
        } else if b.is_ascii_digit() {
            while cur
                .peek(0)
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'.' || c == b'_')
            {
                cur.pos += 1;
            }
            TOKEN_NUMBER.to_string()
        } else {
            let width = text[start..].chars().next().map_or(1, char::len_utf8);
            cur.pos += width;
            text[start..cur.pos].to_string()
        };

        tokens.push(token);
        regions.push(Region::new(start_row, start_col, cur.row, cur.col())?);
    }

    TokenizedFile::new(path, text, tokens, regions)
}
