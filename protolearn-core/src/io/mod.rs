//! Readers and writers for the three text file formats exchanged at the
//! classifier-training boundary (`SPEC_FULL.md` §6.1): the ParamDesc
//! per-dimension descriptor header, the normproto prototype file, and the
//! Microfeat class-library dump.
//!
//! Every reader is generic over [`std::io::Read`] and every writer over
//! [`std::io::Write`], so callers can point them at a file, a
//! [`std::io::Cursor`], or any other transport without the format logic
//! caring which.

pub mod microfeat;
pub mod normproto;
pub mod paramdesc;

pub use microfeat::{read_microfeat, write_microfeat};
pub use normproto::{NormProtoClass, read_normproto, write_normproto};
pub use paramdesc::{read_param_descs, write_param_descs};

use std::io::Read;

use crate::error::IoError;

/// Reads all of `reader` into a string and splits it into whitespace-
/// separated tokens, matching the formats' own stated grammar ("the parser
/// expects whitespace separation and exactly the number of fields implied
/// by the style header" — `spec.md` §6). None of these formats are
/// line-sensitive, so a flat token cursor is simpler than a line reader.
pub(crate) struct TokenCursor {
    tokens: Vec<String>,
    pos: usize,
}

impl TokenCursor {
    pub(crate) fn from_reader(mut reader: impl Read) -> Result<Self, IoError> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents).map_err(|source| IoError::Transport { source })?;
        let tokens = contents.split_whitespace().map(ToOwned::to_owned).collect();
        Ok(Self { tokens, pos: 0 })
    }

    pub(crate) fn next_token(&mut self, what: &'static str) -> Result<String, IoError> {
        let token = self.tokens.get(self.pos).cloned().ok_or_else(|| IoError::MalformedRecord {
            what,
            detail: "unexpected end of input".to_owned(),
        })?;
        self.pos += 1;
        Ok(token)
    }

    pub(crate) fn next_usize(&mut self, what: &'static str) -> Result<usize, IoError> {
        let token = self.next_token(what)?;
        token.parse().map_err(|_source| IoError::MalformedRecord {
            what,
            detail: format!("expected an unsigned integer, got `{token}`"),
        })
    }

    pub(crate) fn next_i32(&mut self, what: &'static str) -> Result<i32, IoError> {
        let token = self.next_token(what)?;
        token.parse().map_err(|_source| IoError::MalformedRecord {
            what,
            detail: format!("expected an integer, got `{token}`"),
        })
    }

    pub(crate) fn next_u32(&mut self, what: &'static str) -> Result<u32, IoError> {
        let token = self.next_token(what)?;
        token.parse().map_err(|_source| IoError::MalformedRecord {
            what,
            detail: format!("expected an unsigned integer, got `{token}`"),
        })
    }

    pub(crate) fn next_f32(&mut self, what: &'static str) -> Result<f32, IoError> {
        let token = self.next_token(what)?;
        token.parse().map_err(|_source| IoError::MalformedRecord {
            what,
            detail: format!("expected a floating-point number, got `{token}`"),
        })
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_cursor_splits_on_any_whitespace() {
        let mut cursor = TokenCursor::from_reader("1   2\n3\t4".as_bytes()).expect("reads successfully");
        assert_eq!(cursor.next_usize("test").expect("first token"), 1);
        assert_eq!(cursor.next_usize("test").expect("second token"), 2);
        assert_eq!(cursor.next_usize("test").expect("third token"), 3);
        assert_eq!(cursor.next_usize("test").expect("fourth token"), 4);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn token_cursor_reports_malformed_integers() {
        let mut cursor = TokenCursor::from_reader("not-a-number".as_bytes()).expect("reads successfully");
        let err = cursor.next_usize("count").expect_err("not a valid usize");
        assert_eq!(err.code().as_str(), "malformed_record");
    }
}
