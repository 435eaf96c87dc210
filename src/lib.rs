/*!
A just-in-time-style, NFA-simulation regular expression engine with a
streaming match interface.

A pattern is compiled once through five pipeline stages into a
[`Machine`]: compiled accept-test code plus sizing metadata. A
[`Match`] is then driven across input one chunk at a time, tracking the
best (leftmost, then longest-or-shortest depending on greediness) match
seen so far, so very long input can be scanned in bounded memory
across multiple [`Match::continue_match`] calls, instead of requiring
the whole haystack up front.

## Usage
```
use regexjit::Machine;

let machine = Machine::builder("ab*c").build().unwrap();
let mut m = machine.new_match().unwrap();
m.continue_match(b"xyabbbcz");
let result = m.result().unwrap();
assert_eq!((result.begin, result.end), (2, 7));
```

## Syntax

| Construct        | Meaning                                          |
|-------------------|--------------------------------------------------|
| `abc`             | literal characters                                |
| `.`                | any character (excludes `\n`/`\r` under `NEWLINE`) |
| `[abc]`, `[^abc]`  | character class, negated class                    |
| `[a-z]`            | character range inside a class                    |
| `a\|b`             | alternation                                       |
| `(...)`            | grouping                                          |
| `a*`, `a+`, `a?`   | zero-or-more, one-or-more, zero-or-one             |
| `a{n}`             | exactly `n` repetitions                            |
| `a{n,}`            | `n` or more repetitions                            |
| `a{n,m}`           | between `n` and `m` repetitions                    |
| `a{,m}`            | up to `m` repetitions                              |
| `a{n!}`            | exactly `n`, tagging the branch for `id_check`      |
| `^`, `$`           | literal start/end-of-input anchors                 |
| `\c`               | escape a metacharacter                             |

No backreferences, lookaround, named groups, Unicode property classes,
or case folding (see the crate's design notes for the full list of
excluded functionality).

## Performance
The following `Cargo.toml` settings are recommended if best performance
is desired:
```toml
[profile.release]
lto = "fat"
codegen-units = 1
```

## Crate features
*/
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(feature = "doc", doc = document_features::document_features!())]

extern crate alloc;

mod compile;
pub mod emit;
pub mod error;
pub mod flags;
mod item;
pub mod machine;
mod parser;
mod prefilter;
pub mod regex_match;
#[cfg(feature = "alloc")]
pub mod scanner;
mod stack;
mod state;
mod trace;
mod transitions;

pub use error::{Error, Result};
pub use flags::{CodeUnit, CompileFlags};
pub use machine::Machine;
pub use regex_match::{Match, MatchResult};
#[cfg(feature = "alloc")]
pub use scanner::{Scanner, StreamMatch};

#[cfg(test)]
mod tests {
    use crate::{CompileFlags, Machine};

    #[test]
    fn leftmost_longest_match_wins_among_overlapping_candidates() {
        let machine = Machine::builder("a|ab").build().unwrap();
        let mut m = machine.new_match().unwrap();
        m.continue_match(b"ab");
        let result = m.result().unwrap();
        assert_eq!((result.begin, result.end), (0, 2));
    }

    #[test]
    fn non_greedy_prefers_the_shortest_match_at_the_same_begin() {
        let machine = Machine::builder("a|ab").flags(CompileFlags::MATCH_NON_GREEDY).build().unwrap();
        let mut m = machine.new_match().unwrap();
        m.continue_match(b"ab");
        let result = m.result().unwrap();
        assert_eq!((result.begin, result.end), (0, 1));
    }

    #[test]
    fn match_begin_anchors_to_the_very_first_character() {
        let machine = Machine::builder("b").flags(CompileFlags::MATCH_BEGIN).build().unwrap();
        let mut m = machine.new_match().unwrap();
        m.continue_match(b"ab");
        assert!(m.result().is_none());
    }

    #[test]
    fn match_end_requires_reaching_the_end_of_consumed_input() {
        let machine = Machine::builder("ab").flags(CompileFlags::MATCH_END).build().unwrap();
        let mut m = machine.new_match().unwrap();
        m.continue_match(b"xab");
        assert!(m.result().is_some());
        m.continue_match(b"c");
        assert!(m.result().is_none());
    }

    #[test]
    fn character_class_and_negation_match_the_expected_sets() {
        let machine = Machine::builder("[a-c]+").build().unwrap();
        let mut m = machine.new_match().unwrap();
        m.continue_match(b"zzabcz");
        let result = m.result().unwrap();
        assert_eq!((result.begin, result.end), (2, 5));

        let machine = Machine::builder("[^a-c]+").build().unwrap();
        let mut m = machine.new_match().unwrap();
        m.continue_match(b"abxyzc");
        let result = m.result().unwrap();
        assert_eq!((result.begin, result.end), (2, 5));
    }

    #[test]
    fn bounded_repetition_enforces_its_min_and_max() {
        let machine = Machine::builder("a{2,3}").build().unwrap();
        let mut m = machine.new_match().unwrap();
        m.continue_match(b"aaaa");
        let result = m.result().unwrap();
        assert_eq!((result.begin, result.end), (0, 3));
    }

    #[test]
    fn reset_allows_reusing_one_match_object_for_a_fresh_scan() {
        let machine = Machine::builder("a").build().unwrap();
        let mut m = machine.new_match().unwrap();
        m.continue_match(b"xa");
        assert!(m.result().is_some());
        m.reset();
        assert!(m.result().is_none());
        m.continue_match(b"yyy");
        assert!(m.result().is_none());
    }

    #[test]
    fn invalid_pattern_reports_the_offending_position() {
        let err = Machine::builder("ab)").build().unwrap_err();
        match err {
            crate::Error::InvalidPattern { position, .. } => assert_eq!(position, 2),
            crate::Error::Memory => panic!("expected InvalidPattern"),
        }
    }
}
