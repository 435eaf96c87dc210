//! A streaming convenience layer over [`crate::regex_match::Match`] (§9):
//! the low-level `continue_match`/`result` pair mirrors the C API 1:1 and
//! expects the caller to know when to stop feeding input. [`Scanner`]
//! wraps that loop so a match can be pulled out of input that arrives in
//! bounded-size pieces (a chunked upload, a buffered reader) without
//! holding the whole haystack in memory at once.

use crate::machine::Machine;
use crate::regex_match::{Match, MatchResult};

/// One match surfaced by a [`Scanner`]: identical in shape to
/// [`MatchResult`], named separately because it carries stream-relative
/// meaning (offsets are from the start of the whole stream, not of the
/// chunk that completed the match).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamMatch {
    pub begin: usize,
    pub end: usize,
    pub id: i64,
}

impl From<MatchResult> for StreamMatch {
    fn from(r: MatchResult) -> Self {
        StreamMatch { begin: r.begin, end: r.end, id: r.id }
    }
}

/// Drives one [`Match`] across however many chunks it takes to either
/// find a match or exhaust the input. Feed chunks with [`Scanner::feed`];
/// call [`Scanner::finish`] once the source is exhausted.
pub struct Scanner<'m> {
    inner: Match<'m>,
}

impl<'m> Scanner<'m> {
    /// Starts a new scan over `machine`, or `None` on allocation failure
    /// (the same condition under which [`Machine::new_match`] fails).
    pub fn new(machine: &'m Machine) -> Option<Self> {
        Some(Scanner { inner: machine.new_match()? })
    }

    /// Feeds one chunk of 8-bit code units. Returns the match
    /// immediately if this chunk was enough to conclude the scan can't
    /// improve any further (a non-greedy, `MATCH_BEGIN`-anchored hit);
    /// otherwise the caller should keep feeding chunks and eventually
    /// call [`Scanner::finish`].
    pub fn feed(&mut self, chunk: &[u8]) -> Option<StreamMatch> {
        self.inner.continue_match(chunk);
        if self.inner.is_finished() {
            self.inner.result().map(StreamMatch::from)
        } else {
            None
        }
    }

    /// Feeds one chunk of 16-bit code units; see [`Scanner::feed`].
    pub fn feed_u16(&mut self, chunk: &[u16]) -> Option<StreamMatch> {
        self.inner.continue_match_u16(chunk);
        if self.inner.is_finished() {
            self.inner.result().map(StreamMatch::from)
        } else {
            None
        }
    }

    /// The best match found across every chunk fed so far, without
    /// ending the scan. Useful for polling progress on a long-running
    /// stream before the source is exhausted.
    pub fn partial_result(&self) -> Option<StreamMatch> {
        self.inner.result().map(StreamMatch::from)
    }

    /// Consumes the scanner at end of input and returns whatever match
    /// was found across the whole stream.
    pub fn finish(self) -> Option<StreamMatch> {
        self.inner.result().map(StreamMatch::from)
    }

    /// Starts a fresh scan against the same machine, discarding
    /// whatever progress this scanner had made.
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

/// Runs a [`Scanner`] over anything readable in `std`, reading in
/// `buf_size`-byte chunks until either a conclusive match is found or
/// the reader reaches EOF.
#[cfg(feature = "std")]
pub fn scan_reader<R: std::io::Read>(machine: &Machine, reader: &mut R, buf_size: usize) -> std::io::Result<Option<StreamMatch>> {
    let mut scanner = Scanner::new(machine).ok_or_else(|| std::io::Error::new(std::io::ErrorKind::OutOfMemory, crate::Error::Memory))?;
    let mut buf = vec![0u8; buf_size.max(1)];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Ok(scanner.finish());
        }
        if let Some(m) = scanner.feed(&buf[..n]) {
            return Ok(Some(m));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::CompileFlags;

    #[test]
    fn feed_across_multiple_chunks_finds_a_match_spanning_the_boundary() {
        let machine = Machine::builder("abc").build().unwrap();
        let mut scanner = Scanner::new(&machine).unwrap();
        assert_eq!(scanner.feed(b"xxa"), None);
        assert_eq!(scanner.feed(b"bcxx"), None);
        assert_eq!(scanner.finish(), Some(StreamMatch { begin: 2, end: 5, id: 0 }));
    }

    #[test]
    fn non_greedy_anchored_match_ends_the_scan_early() {
        let machine = Machine::builder("a*").flags(CompileFlags::MATCH_BEGIN | CompileFlags::MATCH_NON_GREEDY).build().unwrap();
        let mut scanner = Scanner::new(&machine).unwrap();
        let result = scanner.feed(b"aaa");
        assert_eq!(result, Some(StreamMatch { begin: 0, end: 0, id: 0 }));
    }

    #[test]
    fn no_match_in_the_whole_stream_yields_none() {
        let machine = Machine::builder("z").build().unwrap();
        let mut scanner = Scanner::new(&machine).unwrap();
        scanner.feed(b"abc");
        scanner.feed(b"def");
        assert_eq!(scanner.finish(), None);
    }

    #[test]
    fn reset_discards_progress_and_starts_over() {
        let machine = Machine::builder("a").build().unwrap();
        let mut scanner = Scanner::new(&machine).unwrap();
        scanner.feed(b"xa");
        assert!(scanner.partial_result().is_some());
        scanner.reset();
        assert_eq!(scanner.partial_result(), None);
    }

    #[cfg(feature = "std")]
    #[test]
    fn scan_reader_reads_a_cursor_in_small_chunks() {
        let machine = Machine::builder("needle").build().unwrap();
        let mut cursor = std::io::Cursor::new(b"hay hay needle stack".to_vec());
        let result = scan_reader(&machine, &mut cursor, 3).unwrap();
        assert_eq!(result, Some(StreamMatch { begin: 8, end: 14, id: 0 }));
    }
}
