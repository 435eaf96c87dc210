//! Component E: the trace helper.
//!
//! From a starting transition position, follows every epsilon edge
//! (`BRANCH` forks both ways, `JUMP` redirects) until it stops at a term
//! (`CHAR`, `RNG_END`, `BEGIN` or `END`), collecting every such term
//! reachable without consuming a character. `ID` markers passed along the
//! way promote a running "color" so that whichever term is finally
//! reached is tagged with the highest id seen on the path that reached
//! it. If more than one path reaches the same term, the higher color
//! wins.
//!
//! The source threads this through the scratch `id` field of a shared
//! state array and reuses the parser's own stack as scratch space for
//! the result list. Here the scratch coloring still lives in the state
//! array (so two trace calls sharing a `states` slice still compose the
//! same way), but the result is just a returned `Vec`. A whole extra
//! buffer for a result list that is read once and discarded is not worth
//! fighting the borrow checker over.

use crate::item::{Item, ItemKind};
use crate::state::SlotInfo;

/// One term reached by a trace, with the color (max id) seen on the way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reached {
    pub position: usize,
    pub id: i64,
}

/// Scratch coloring used during a trace call. Indexed in parallel with
/// the transitions array; `-1` means "not visited by the current call".
pub type Colors = Vec<i64>;

pub fn new_colors(transitions_len: usize) -> Colors {
    vec![-1; transitions_len]
}

/// Runs one trace from `start`, coloring `colors` as it goes and
/// returning every term reached. `colors` must be all `-1` on entry and
/// is restored to all `-1` before returning (matching the source's
/// "reset the scratch values" step, folded into this call instead of
/// left to the caller).
pub fn trace(transitions: &[Item], colors: &mut Colors, start: usize) -> Vec<Reached> {
    let mut results: Vec<Reached> = Vec::new();
    let mut touched: Vec<usize> = Vec::new();
    let mut worklist: Vec<(usize, i64)> = vec![(start, -1)];

    while let Some((mut pos, mut color)) = worklist.pop() {
        loop {
            let item = transitions[pos];
            if item.kind.is_term() {
                if let Some(existing) = results.iter_mut().find(|r| r.position == pos) {
                    if color > existing.id {
                        existing.id = color;
                    }
                } else {
                    results.push(Reached { position: pos, id: color });
                }
                if colors[pos] == -1 {
                    touched.push(pos);
                }
                colors[pos] = colors[pos].max(color);
                break;
            }

            if colors[pos] != -1 && colors[pos] >= color {
                // Already fully explored downstream with at least this
                // color: nothing new can be discovered by continuing.
                // `-1` is also the "unvisited" sentinel, so it must never
                // itself satisfy this guard, otherwise the very first
                // hop of a virgin trace (whose root color is also `-1`)
                // would wrongly look "already explored" and break before
                // following a single edge.
                break;
            }
            if colors[pos] == -1 {
                touched.push(pos);
            }
            colors[pos] = color;

            match item.kind {
                ItemKind::Id => {
                    if item.value > color {
                        color = item.value;
                    }
                    pos += 1;
                }
                ItemKind::RngStart | ItemKind::RngChar | ItemKind::RngLeft | ItemKind::RngRight => {
                    pos += 1;
                }
                ItemKind::Jump => {
                    pos = item.value as usize;
                }
                ItemKind::Branch => {
                    worklist.push((item.value as usize, color));
                    pos += 1;
                }
                _ => unreachable!("non-term kind not handled above"),
            }
        }
    }

    for pos in touched {
        colors[pos] = -1;
    }
    results
}

/// Convenience wrapper for annotator-derived slot metadata: asserts the
/// two arrays describe the same transitions array.
pub fn trace_checked(transitions: &[Item], slots: &[SlotInfo], colors: &mut Colors, start: usize) -> Vec<Reached> {
    debug_assert_eq!(transitions.len(), slots.len());
    trace(transitions, colors, start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::CompileFlags;
    use crate::parser::parse;
    use crate::transitions::generate;

    fn compiled(pattern: &str) -> Vec<Item> {
        let out = parse(pattern, CompileFlags::empty()).unwrap();
        generate(&out.stack, out.dfa_size)
    }

    #[test]
    fn trace_from_begin_reaches_the_first_literal() {
        // Position 0 is BEGIN itself (a term); compile.rs always traces
        // from `pos + 1` (the slot right after a term), so this exercises
        // the same convention: the position right after BEGIN.
        let t = compiled("abc");
        let mut colors = new_colors(t.len());
        let reached = trace(&t, &mut colors, 1);
        assert_eq!(reached.len(), 1);
        assert_eq!(t[reached[0].position].kind, ItemKind::Char);
        assert_eq!(t[reached[0].position].value, 'a' as i64);
        assert!(colors.iter().all(|&c| c == -1));
    }

    #[test]
    fn trace_through_star_reaches_both_the_body_and_the_successor() {
        // ab*c: tracing right after matching 'a' must reach both 'b'
        // (loop again) and 'c' (zero repetitions of b).
        let t = compiled("ab*c");
        let a_pos = t.iter().position(|it| it.kind == ItemKind::Char && it.value == 'a' as i64).unwrap();
        let mut colors = new_colors(t.len());
        let reached = trace(&t, &mut colors, a_pos + 1);
        let chars: Vec<i64> = reached.iter().map(|r| t[r.position].value).collect();
        assert!(chars.contains(&('b' as i64)));
        assert!(chars.contains(&('c' as i64)));
    }

    #[test]
    fn trace_through_alternation_reaches_both_branches() {
        let t = compiled("a(b|c)d");
        let a_pos = t.iter().position(|it| it.kind == ItemKind::Char && it.value == 'a' as i64).unwrap();
        let mut colors = new_colors(t.len());
        let reached = trace(&t, &mut colors, a_pos + 1);
        let chars: Vec<i64> = reached.iter().map(|r| t[r.position].value).collect();
        assert!(chars.contains(&('b' as i64)));
        assert!(chars.contains(&('c' as i64)));
    }

    #[test]
    fn id_marker_colors_the_term_reached_after_it() {
        let t = compiled("a{2!}b");
        // Trace from position 0 (BEGIN's successor) down through the
        // unrolled "aa" should not yet see the id; tracing from right
        // after the second 'a' must see it colors the final 'b'.
        let second_a = {
            let positions: Vec<usize> =
                t.iter().enumerate().filter(|(_, it)| it.kind == ItemKind::Char && it.value == 'a' as i64).map(|(i, _)| i).collect();
            positions[1]
        };
        let mut colors = new_colors(t.len());
        let reached = trace(&t, &mut colors, second_a + 1);
        let b = reached.iter().find(|r| t[r.position].kind == ItemKind::Char && t[r.position].value == 'b' as i64).unwrap();
        assert_eq!(b.id, 2);
    }

    #[test]
    fn trace_is_reusable_after_returning_to_all_minus_one() {
        let t = compiled("a*");
        let mut colors = new_colors(t.len());
        let _ = trace(&t, &mut colors, 0);
        assert!(colors.iter().all(|&c| c == -1));
        let _ = trace(&t, &mut colors, 0); // must not panic or misbehave on reuse
        assert!(colors.iter().all(|&c| c == -1));
    }
}
