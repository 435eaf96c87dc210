//! The fast-forward scanning optimization from §4.F: when the pattern is
//! not anchored with `MATCH_BEGIN`, a newly seeded candidate at the
//! current position is thrown away immediately unless the very next
//! character could begin the pattern at all. Rather than run the full
//! per-character stepping protocol (which would do exactly that: seed,
//! test, fail, discard) while no other candidate is active, a
//! [`Prefilter`] lets [`crate::regex_match::Match`] skip straight to the
//! next position that could plausibly start a match.
//!
//! Only the common case is accelerated: a pattern whose very first
//! term(s) reachable from `BEGIN` are all plain literal characters.
//! Character classes, the empty-prefix case (`END` or any `*`/`?`-headed
//! body reachable with zero width) and non-byte-sized code points fall
//! back to `None`, which simply disables the optimization. Correctness
//! never depends on it, only throughput does.

use itertools::Itertools;

use crate::compile::CompiledTerm;
use crate::item::{Item, ItemKind};

/// Maximum number of distinct leading literals worth prefiltering on.
/// Above this, a manual per-character scan earns back less than the
/// bookkeeping costs, and the source's own fast-forward tables are
/// sized for a handful of alternatives, not an open-ended set.
const MAX_LITERALS: usize = 4;

#[derive(Clone, Debug)]
pub(crate) struct Prefilter {
    literals: Vec<u32>,
}

impl Prefilter {
    /// Builds a prefilter for `machine`'s `BEGIN` term, or `None` if the
    /// pattern's possible start terms aren't all plain literals.
    pub(crate) fn build(transitions: &[Item], term_positions: &[usize], begin: &CompiledTerm) -> Option<Self> {
        if begin.destinations.is_empty() || begin.destinations.len() > MAX_LITERALS {
            return None;
        }
        let mut literals = Vec::with_capacity(begin.destinations.len());
        for dest in &begin.destinations {
            let pos = term_positions[dest.term_index];
            match transitions[pos].kind {
                ItemKind::Char => literals.push(transitions[pos].value as u32),
                // A character class, or BEGIN/END reachable with zero
                // width (an empty-prefix match), means any character
                // could start a match: no useful prefilter.
                _ => return None,
            }
        }
        let literals = literals.into_iter().unique().collect();
        Some(Prefilter { literals })
    }

    pub(crate) fn matches(&self, c: i64) -> bool {
        self.literals.iter().any(|&l| l as i64 == c)
    }

    /// Finds the first byte in `haystack` that could start a match,
    /// using `memchr` for one to three literals and a manual scan
    /// beyond that.
    #[cfg(feature = "perf-fast-forward")]
    pub(crate) fn find_u8(&self, haystack: &[u8]) -> Option<usize> {
        if self.literals.iter().any(|&l| l > 0xFF) {
            return haystack.iter().position(|&b| self.matches(b as i64));
        }
        match *self.literals.as_slice() {
            [a] => memchr::memchr(a as u8, haystack),
            [a, b] => memchr::memchr2(a as u8, b as u8, haystack),
            [a, b, c] => memchr::memchr3(a as u8, b as u8, c as u8, haystack),
            _ => haystack.iter().position(|&b| self.matches(b as i64)),
        }
    }

    pub(crate) fn find_u16(&self, haystack: &[u16]) -> Option<usize> {
        haystack.iter().position(|&u| self.matches(u as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::flags::CompileFlags;
    use crate::parser::parse;
    use crate::state::annotate;
    use crate::transitions::generate;

    fn term_positions_for(pattern: &str) -> (Vec<Item>, Vec<usize>, Vec<CompiledTerm>, usize) {
        let out = parse(pattern, CompileFlags::empty()).unwrap();
        let transitions = generate(&out.stack, out.dfa_size);
        let annotation = annotate(&transitions);
        let mut positions = vec![0usize; annotation.terms_size];
        for (pos, slot) in annotation.slots.iter().enumerate() {
            if let Some(t) = slot.term_index {
                positions[t] = pos;
            }
        }
        let compiled = compile(&transitions, &annotation).unwrap();
        (transitions, positions, compiled.terms, annotation.begin_term_index)
    }

    #[test]
    fn single_leading_literal_builds_a_prefilter() {
        let (transitions, positions, terms, begin) = term_positions_for("abc");
        let pf = Prefilter::build(&transitions, &positions, &terms[begin]).unwrap();
        assert!(pf.matches('a' as i64));
        assert!(!pf.matches('b' as i64));
    }

    #[test]
    fn alternation_of_literals_builds_a_multi_member_prefilter() {
        let (transitions, positions, terms, begin) = term_positions_for("a|b");
        let pf = Prefilter::build(&transitions, &positions, &terms[begin]).unwrap();
        assert!(pf.matches('a' as i64));
        assert!(pf.matches('b' as i64));
        assert!(!pf.matches('c' as i64));
    }

    #[test]
    fn leading_character_class_disables_the_prefilter() {
        let (transitions, positions, terms, begin) = term_positions_for("[ab]c");
        assert!(Prefilter::build(&transitions, &positions, &terms[begin]).is_none());
    }

    #[test]
    fn leading_optional_term_disables_the_prefilter() {
        // `a?b`: BEGIN can reach both 'a' and 'b' with zero width, but 'b'
        // alone is still a literal char destination, so this one *does*
        // build. The empty-prefix case that disables it is exercised by
        // a star/question whose destination set includes END itself.
        let (transitions, positions, terms, begin) = term_positions_for("a*");
        // a*: BEGIN's destinations are 'a' and END (zero repetitions).
        assert!(Prefilter::build(&transitions, &positions, &terms[begin]).is_none());
    }
}
