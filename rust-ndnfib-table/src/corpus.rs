//! URL corpus reader.
//!
//! A corpus is a text file of whitespace-separated URLs, read in one linear
//! pass.

use log::debug;
use rust_ndnfib_common::prefix::lossy;
use rust_ndnfib_common::{Error, Result};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Streams the URLs of a corpus.
///
/// Each yielded URL is shorter than `max_url_len` bytes, which leaves room
/// for the synthesised trailing delimiter.
#[derive(Debug)]
pub struct UrlCorpus<R> {
    reader: R,
    line: Vec<u8>,
    pending: VecDeque<Vec<u8>>,
    max_url_len: usize,
}

impl UrlCorpus<BufReader<File>> {
    /// Opens the corpus at `path`.
    pub fn open<P: AsRef<Path>>(path: P, max_url_len: usize) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening URL corpus {}", path.display());
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file), max_url_len))
    }
}

impl<R: BufRead> UrlCorpus<R> {
    pub fn from_reader(reader: R, max_url_len: usize) -> Self {
        Self {
            reader,
            line: Vec::new(),
            pending: VecDeque::new(),
            max_url_len,
        }
    }

    fn admit(&self, url: Vec<u8>) -> Result<Vec<u8>> {
        if url.len() >= self.max_url_len {
            return Err(Error::UrlTooLong {
                url: lossy(&url).into_owned(),
                len: url.len(),
                max: self.max_url_len.saturating_sub(1),
            });
        }
        Ok(url)
    }
}

impl<R: BufRead> Iterator for UrlCorpus<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(url) = self.pending.pop_front() {
                return Some(self.admit(url));
            }
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => return None,
                Ok(_) => self.pending.extend(
                    self.line
                        .split(|b| b.is_ascii_whitespace())
                        .filter(|token| !token.is_empty())
                        .map(<[u8]>::to_vec),
                ),
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Number of URLs in the corpus at `path`.
pub fn count_urls<P: AsRef<Path>>(path: P) -> Result<usize> {
    let mut count = 0;
    for url in UrlCorpus::open(path, usize::MAX)? {
        url?;
        count += 1;
    }
    Ok(count)
}

/// URLs packed into fixed-size, zero-padded slots of one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlArray {
    stride: usize,
    data: Vec<u8>,
}

impl UrlArray {
    /// Packs `urls` into slots of `stride` bytes.
    pub fn from_urls<I>(urls: I, stride: usize) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Vec<u8>>>,
    {
        let mut data = Vec::new();
        for url in urls {
            let url = url?;
            if url.len() > stride {
                return Err(Error::UrlTooLong {
                    url: lossy(&url).into_owned(),
                    len: url.len(),
                    max: stride,
                });
            }
            let start = data.len();
            data.resize(start + stride, 0);
            data[start..start + url.len()].copy_from_slice(&url);
        }
        Ok(Self { stride, data })
    }

    /// Slot size in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The URL in slot `i`, without padding.
    pub fn get(&self, i: usize) -> Option<&[u8]> {
        let slot = self.data.get(i * self.stride..(i + 1) * self.stride)?;
        let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
        Some(&slot[..end])
    }

    /// The raw slot buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

/// All URLs at `path` in slots of `max_url_len` bytes.
pub fn url_array<P: AsRef<Path>>(path: P, max_url_len: usize) -> Result<UrlArray> {
    UrlArray::from_urls(UrlCorpus::open(path, max_url_len)?, max_url_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn urls(text: &str, max: usize) -> Vec<Result<Vec<u8>>> {
        UrlCorpus::from_reader(Cursor::new(text.as_bytes().to_vec()), max).collect()
    }

    #[test]
    fn test_tokens_split_on_any_whitespace() {
        let got: Vec<Vec<u8>> = urls("/a/b  /c\n\n\t/d/e/\r\n/f", 128)
            .into_iter()
            .map(|u| u.unwrap())
            .collect();
        assert_eq!(got, vec![b"/a/b".to_vec(), b"/c".to_vec(), b"/d/e/".to_vec(), b"/f".to_vec()]);
    }

    #[test]
    fn test_long_url_rejected() {
        let got = urls("/abc /abcd", 5);
        assert!(got[0].is_ok());
        assert!(matches!(got[1], Err(Error::UrlTooLong { len: 5, max: 4, .. })));
    }

    #[test]
    fn test_count_and_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "/a/b\n/cc\n/ddd/e/\n").unwrap();

        assert_eq!(count_urls(file.path()).unwrap(), 3);

        let array = url_array(file.path(), 16).unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array.as_bytes().len(), 48);
        assert_eq!(array.get(1), Some(&b"/cc"[..]));
        assert_eq!(array.get(3), None);
        assert_eq!(array.iter().collect::<Vec<_>>(), vec![&b"/a/b"[..], b"/cc", b"/ddd/e/"]);
        assert_eq!(&array.as_bytes()[16..20], &[b'/', b'c', b'c', 0]);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(count_urls("/nonexistent/urls.txt"), Err(Error::Io(_))));
    }
}
