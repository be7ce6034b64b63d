//! URL prefix decomposition.
//!
//! A URL `/a/b/c` names a path on the NDN name tree. The FIB stores every
//! node on that path as a `/`-terminated prefix: `/`, `/a/`, `/a/b/` are
//! interior prefixes and `/a/b/c/` is the terminal one.

use std::borrow::Cow;
use std::fmt;

/// Component delimiter. Every stored key ends with it.
pub const DELIMITER: u8 = b'/';

/// One prefix produced by walking a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefix<'a> {
    key: &'a [u8],
    terminal: bool,
}

impl<'a> Prefix<'a> {
    /// The prefix bytes, trailing delimiter included.
    pub fn key(&self) -> &'a [u8] {
        self.key
    }

    /// Whether this prefix is the full URL.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.key.len()
    }

    /// Always false; a prefix holds at least its delimiter.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl fmt::Display for Prefix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", lossy(self.key))
    }
}

/// The prefixes of one URL.
///
/// Owns a copy of the URL with the trailing delimiter synthesised when the
/// URL lacks one, so that every yielded key ends in [`DELIMITER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefixes {
    buf: Vec<u8>,
}

impl Prefixes {
    /// Decomposes `url`.
    pub fn new(url: &[u8]) -> Self {
        let mut buf = Vec::with_capacity(url.len() + 1);
        buf.extend_from_slice(url);
        if buf.last() != Some(&DELIMITER) {
            buf.push(DELIMITER);
        }
        Self { buf }
    }

    /// The terminal key: the URL with its trailing delimiter.
    pub fn terminal(&self) -> &[u8] {
        &self.buf
    }

    /// Interior prefixes in order of increasing length, then the terminal.
    pub fn iter(&self) -> impl Iterator<Item = Prefix<'_>> + '_ {
        let last = self.buf.len() - 1;
        self.buf
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == DELIMITER)
            .map(move |(i, _)| Prefix {
                key: &self.buf[..=i],
                terminal: i == last,
            })
    }

    /// Number of prefixes [`Prefixes::iter`] yields.
    pub fn count(&self) -> usize {
        self.buf.iter().filter(|&&b| b == DELIMITER).count()
    }
}

/// Number of `/`-delimited components of a URL: the slash count plus one
/// for the implicit tail.
pub fn num_components(url: &[u8]) -> usize {
    url.iter().filter(|&&b| b == DELIMITER).count() + 1
}

/// Renders key bytes for diagnostics.
pub fn lossy(key: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(key)
}
