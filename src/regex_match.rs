//! Component G: the runtime match object. Owns the two state arrays
//! (`current`/`next`), the active-term linked list, and all best-match
//! bookkeeping, and drives the per-character stepping protocol of §4.F.3
//! against a compiled [`crate::Machine`].

use crate::flags::CompileFlags;
use crate::machine::Machine;

/// One row of a state array (§3). The source packs `no_states` machine
/// words per term and varies that width by compile-time flags; here
/// every row carries all four fields unconditionally, a fixed,
/// type-safe shape in exchange for a few unused words on the
/// `MATCH_BEGIN` fast path. `active` stands in for the source's `-1`
/// "not active" sentinel in `slot[1]`; `next` is the chain pointer
/// proper, using `Option<usize>` instead of a byte offset with a
/// dual-purpose `0`/`-1` sentinel pair (see `DESIGN.md`).
#[derive(Clone, Copy, Debug)]
struct Slot {
    active: bool,
    next: Option<usize>,
    /// Character index at which this candidate's match began.
    start: i64,
    /// Highest `{n!}` id seen on the trace that activated this term.
    id: i64,
}

impl Slot {
    const EMPTY: Slot = Slot { active: false, next: None, start: 0, id: 0 };
}

/// The best match found so far, returned by [`Match::result`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub begin: usize,
    pub end: usize,
    pub id: i64,
}

/// A live scan against one [`Machine`]. Create with
/// [`Machine::new_match`], feed input with [`Match::continue_match`] (or
/// [`Match::continue_match_u16`]) one chunk at a time, and read
/// [`Match::result`] whenever, including between chunks, for a
/// best-effort read of the match found so far.
///
/// `!Sync`: the state arrays are exclusively owned and mutated in place.
/// `Send`: nothing here is thread-affine, so a `Match` may be moved to
/// another thread (just not shared by reference across threads at once).
pub struct Match<'m> {
    machine: &'m Machine,
    current: Vec<Slot>,
    next: Vec<Slot>,
    head: Option<usize>,
    /// Number of characters consumed so far; also the position of the
    /// next character about to be read.
    index: i64,
    best_begin: i64,
    best_end: i64,
    best_id: i64,
    fast_quit: bool,
    /// Head of the array being built by the step currently in progress.
    /// `step` drains `self.head`/`self.current` while filling this one,
    /// then swaps it into `self.head` once the drain completes. Kept as
    /// a field rather than a local so `conditional_insert` can be a
    /// plain associated function taking `&mut Vec<Slot>` and
    /// `&mut Option<usize>` without borrowing all of `self`.
    next_head_holder: Option<usize>,
    /// Whether every currently active term is there purely because
    /// `reseed_current` just put it there, i.e. nothing has survived
    /// from actually matching a character of the pattern body yet. Fast
    /// forward only ever skips ahead while this holds (§4.F).
    only_fresh_start: bool,
}

impl<'m> Match<'m> {
    /// `begin_match`: allocates the two state arrays, returning `None`
    /// only on allocation failure (§6, §7).
    pub(crate) fn new(machine: &'m Machine) -> Option<Self> {
        let n = machine.terms_size();
        let mut current = Vec::new();
        let mut next = Vec::new();
        current.try_reserve_exact(n).ok()?;
        next.try_reserve_exact(n).ok()?;
        current.resize(n, Slot::EMPTY);
        next.resize(n, Slot::EMPTY);
        let mut m = Match {
            machine,
            current,
            next,
            head: None,
            index: 0,
            best_begin: -1,
            best_end: 0,
            best_id: 0,
            fast_quit: false,
            next_head_holder: None,
            only_fresh_start: true,
        };
        m.reset();
        Some(m)
    }

    /// `reset_match`: purges the active list, re-seeds `BEGIN`'s
    /// destinations at position 0, and clears all best-match
    /// bookkeeping. Idempotent: calling `reset` twice in a row leaves
    /// the same state as calling it once (§8 testable property 5).
    pub fn reset(&mut self) {
        for slot in self.current.iter_mut().chain(self.next.iter_mut()) {
            *slot = Slot::EMPTY;
        }
        self.head = None;
        self.next_head_holder = None;
        self.index = 0;
        self.best_begin = -1;
        self.best_end = 0;
        self.best_id = 0;
        self.fast_quit = false;
        self.only_fresh_start = true;

        self.reseed_current(0);
    }

    /// `init_match`: activates `BEGIN`'s destinations (the real terms
    /// reachable without consuming a character, computed once at compile
    /// time) directly in `self.current` at `start`, instead of placing
    /// `BEGIN` itself in the active list. `BEGIN` is a zero-width anchor:
    /// it never tests a character, so folding it into the same
    /// test-then-insert loop as a real term would burn one character's
    /// worth of delay before its destinations ever see input. Calling
    /// this directly, once at `reset` and once more per character for an
    /// unanchored search, reseeds the real terms as of *this* position
    /// instead of the position after it.
    fn reseed_current(&mut self, start: i64) {
        let machine = self.machine;
        let id_check = machine.id_check();
        for dest in &machine.terms()[machine.begin_term_index()].destinations {
            let id = if id_check { dest.id.max(0) } else { 0 };
            Self::conditional_insert(&mut self.current, &mut self.head, dest.term_index, start, id, id_check, false);
        }
    }

    /// Jumps the scan ahead to `new_index` after a fast-forward skip.
    /// Only ever called while [`Self::fast_forward_eligible`] held, so
    /// every active term is a fresh reseed that hasn't matched anything
    /// yet. Those are stale guesses about a start position we've now
    /// skipped past, not progress worth preserving, so this discards
    /// them outright and reseeds fresh ones at the landing position
    /// instead of leaving their `start` pointing at the skipped-over
    /// position.
    fn skip_to(&mut self, new_index: i64) {
        let mut cur = self.head;
        while let Some(t) = cur {
            let next_ptr = self.current[t].next;
            self.current[t].active = false;
            self.current[t].next = None;
            cur = next_ptr;
        }
        self.head = None;
        self.index = new_index;
        self.reseed_current(new_index);
    }

    /// `continue_match` for an 8-bit-code-unit machine.
    pub fn continue_match(&mut self, chunk: &[u8]) {
        debug_assert_eq!(self.machine.code_unit(), crate::flags::CodeUnit::U8);
        let mut i = 0usize;
        while i < chunk.len() {
            if self.fast_quit {
                return;
            }
            #[cfg(feature = "perf-fast-forward")]
            if self.fast_forward_eligible() {
                if let Some(pf) = self.machine.prefilter() {
                    match pf.find_u8(&chunk[i..]) {
                        // A hit right here: fall back into the normal
                        // step below instead of looping with a no-op
                        // skip, which would never make progress.
                        Some(0) => {}
                        Some(skip) => {
                            self.skip_to(self.index + skip as i64);
                            i += skip;
                            continue;
                        }
                        None => {
                            self.skip_to(self.index + (chunk.len() - i) as i64);
                            return;
                        }
                    }
                }
            }
            self.step(chunk[i] as i64);
            i += 1;
        }
    }

    /// `continue_match` for a 16-bit-code-unit machine.
    pub fn continue_match_u16(&mut self, chunk: &[u16]) {
        debug_assert_eq!(self.machine.code_unit(), crate::flags::CodeUnit::U16);
        let mut i = 0usize;
        while i < chunk.len() {
            if self.fast_quit {
                return;
            }
            if self.fast_forward_eligible() {
                if let Some(pf) = self.machine.prefilter() {
                    match pf.find_u16(&chunk[i..]) {
                        Some(0) => {}
                        Some(skip) => {
                            self.skip_to(self.index + skip as i64);
                            i += skip;
                            continue;
                        }
                        None => {
                            self.skip_to(self.index + (chunk.len() - i) as i64);
                            return;
                        }
                    }
                }
            }
            self.step(chunk[i] as i64);
            i += 1;
        }
    }

    /// Whether every active term is a fresh `BEGIN` reseed with nothing
    /// from the pattern body actually in flight: the only state in which
    /// skipping ahead changes nothing but the character index (§4.F
    /// "fast-forward optimization").
    fn fast_forward_eligible(&self) -> bool {
        !self.machine.flags().contains(CompileFlags::MATCH_BEGIN) && self.only_fresh_start
    }

    /// Advances the NFA by exactly one character: tests every active
    /// term against `c`, inserts accepted terms' destinations into the
    /// `next` array under the tie-break rules of §4.F, swaps the two
    /// arrays, reseeds a fresh leftmost candidate for an unanchored
    /// search, then runs the end-of-match check.
    fn step(&mut self, c: i64) {
        let id_check = self.machine.id_check();
        let non_greedy = self.machine.flags().contains(CompileFlags::MATCH_NON_GREEDY);
        let program = self.machine.program();

        let mut cur = self.head;
        while let Some(t) = cur {
            let next_ptr = self.current[t].next;
            let source = self.current[t];

            let accepted = crate::compile::accepts(program, &self.machine.terms()[t], c);
            if accepted {
                for dest in &self.machine.terms()[t].destinations {
                    let new_id = if id_check { source.id.max(dest.id) } else { 0 };
                    Self::conditional_insert(&mut self.next, &mut self.next_head_holder, dest.term_index, source.start, new_id, id_check, non_greedy);
                }
            }

            self.current[t].active = false;
            self.current[t].next = None;
            cur = next_ptr;
        }

        let survived = self.next_head_holder.is_some();
        core::mem::swap(&mut self.current, &mut self.next);
        self.head = self.next_head_holder.take();
        self.index += 1;

        if !self.machine.flags().contains(CompileFlags::MATCH_BEGIN) {
            self.reseed_current(self.index);
        }
        self.only_fresh_start = !survived;

        self.check_end_of_match(non_greedy);
    }

    /// Inserts `dest` into the `next` array rooted at `*head`, applying
    /// the leftmost-wins / id-max tie-break of §4.F's "conditional
    /// transition": a strictly earlier start always wins; on an exact
    /// tie, the higher id wins when `ID_CHECK` is set. `non_greedy` has
    /// no effect here: the greedy/non-greedy split governs which *end*
    /// wins at `BEGIN`'s successor (`check_end_of_match`), not which
    /// start wins among threads racing for the same term (leftmost
    /// match is leftmost regardless of greediness).
    fn conditional_insert(next: &mut [Slot], head: &mut Option<usize>, dest: usize, start: i64, id: i64, id_check: bool, _non_greedy: bool) {
        if !next[dest].active {
            next[dest].active = true;
            next[dest].next = *head;
            *head = Some(dest);
            next[dest].start = start;
            next[dest].id = if id_check { id } else { 0 };
            return;
        }
        if start < next[dest].start {
            next[dest].start = start;
            if id_check {
                next[dest].id = id;
            }
        } else if start == next[dest].start && id_check {
            next[dest].id = next[dest].id.max(id);
        }
    }

    fn check_end_of_match(&mut self, non_greedy: bool) {
        let end = self.machine.end_term_index();
        if !self.current[end].active {
            return;
        }
        let candidate_begin = self.current[end].start;
        let candidate_end = self.index;
        let candidate_id = self.current[end].id;

        let take = self.best_begin == -1
            || if non_greedy {
                candidate_begin < self.best_begin
            } else {
                candidate_begin <= self.best_begin
            };
        if take {
            self.best_begin = candidate_begin;
            self.best_end = candidate_end;
            self.best_id = candidate_id;
            if non_greedy && self.machine.flags().contains(CompileFlags::MATCH_BEGIN) {
                self.fast_quit = true;
            }
        }

        if self.best_begin != -1 {
            self.purge_worse_than(self.best_begin, non_greedy);
        }
    }

    /// Drops every active thread that cannot beat `best_begin`: strictly
    /// later (greedy) or no-earlier (non-greedy) than the best start
    /// found so far can never produce a better leftmost match.
    fn purge_worse_than(&mut self, best_begin: i64, non_greedy: bool) {
        let mut survivors = Vec::new();
        let mut cur = self.head;
        while let Some(t) = cur {
            let next_ptr = self.current[t].next;
            let remove = if non_greedy {
                self.current[t].start >= best_begin
            } else {
                self.current[t].start > best_begin
            };
            if remove {
                self.current[t].active = false;
                self.current[t].next = None;
            } else {
                survivors.push(t);
            }
            cur = next_ptr;
        }
        let mut head = None;
        for &t in survivors.iter().rev() {
            self.current[t].next = head;
            head = Some(t);
        }
        self.head = head;
    }

    /// `get_result`: the best match found so far, or `None` ("no
    /// acceptable match in the scanned prefix", §7). When `MATCH_END` is
    /// set, the incrementally tracked best-match is ignored in favor of
    /// requiring the match to reach exactly the end of consumed input:
    /// only `END` being active in the current array (i.e. right after
    /// the very last character fed) counts.
    pub fn result(&self) -> Option<MatchResult> {
        if self.machine.flags().contains(CompileFlags::MATCH_END) {
            let end = self.machine.end_term_index();
            if !self.current[end].active {
                return None;
            }
            return Some(MatchResult {
                begin: self.current[end].start as usize,
                end: self.index as usize,
                id: self.current[end].id,
            });
        }
        if self.best_begin == -1 {
            None
        } else {
            Some(MatchResult { begin: self.best_begin as usize, end: self.best_end as usize, id: self.best_id })
        }
    }

    /// `is_finished`: set once a non-greedy, `MATCH_BEGIN`-anchored scan
    /// has found its (necessarily minimal) match and further input
    /// cannot improve it.
    pub fn is_finished(&self) -> bool {
        self.fast_quit
    }

    #[cfg(feature = "verbose")]
    pub fn step_debug(&mut self, c: i64) {
        eprintln!("--- step index={} char={:?} head={:?}", self.index, c, self.head);
        self.step(c);
        eprintln!("    -> head={:?} best=({}, {}, {})", self.head, self.best_begin, self.best_end, self.best_id);
    }
}

#[cfg(test)]
mod tests {
    use crate::machine::Machine;

    #[test]
    fn fast_forward_miss_across_a_chunk_boundary_matches_the_single_chunk_form() {
        let machine = Machine::builder("a").build().unwrap();
        let mut m = machine.new_match().unwrap();
        m.continue_match(b"xxx");
        m.continue_match(b"a");
        let result = m.result().unwrap();
        assert_eq!((result.begin, result.end), (3, 4));

        let mut whole = machine.new_match().unwrap();
        whole.continue_match(b"xxxa");
        let whole_result = whole.result().unwrap();
        assert_eq!((result.begin, result.end), (whole_result.begin, whole_result.end));
    }
}

