//! Component C: rewrites the parser's flat token stack into the dense
//! transitions array the rest of the pipeline runs on.
//!
//! The source builds this array by walking the stack top to bottom and
//! writing back to front, threading a side "depth" stack so a `BRANCH`'s
//! target can be recorded before the code at that target exists yet. That
//! shape is forced by an append-only paged stack: the only way to place an
//! item "before" one already written is to have written the whole tail
//! first. A `Vec`-backed array doesn't have that constraint, so this
//! walks the stack in its natural left-to-right order instead and builds
//! each subexpression as a self-contained fragment addressed relative to
//! its own start, splicing fragments together (and only then resolving
//! every offset to an absolute index) the way a textbook Thompson
//! construction does. Same transitions array, same `BRANCH`/`JUMP` edges,
//! same `BEGIN` at 0 and `END` at the last slot, just assembled forward
//! instead of backward, which the source's own design notes call out as
//! an equivalent substitution.

use crate::item::{Item, ItemKind};
use crate::stack::SegmentedStack;

/// A self-contained run of items whose `Branch`/`Jump` targets are
/// indices relative to this fragment's own start (index 0 = the
/// fragment's first item).
struct Fragment(Vec<Item>);

impl Fragment {
    fn single(item: Item) -> Self {
        Fragment(vec![item])
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    /// Appends `other`'s items to `self`, rebasing every `Branch`/`Jump`
    /// target in `other` by `self`'s current length.
    fn append(&mut self, other: Fragment) {
        let base = self.0.len() as i64;
        self.0.extend(other.0.into_iter().map(|item| match item.kind {
            ItemKind::Branch | ItemKind::Jump => Item::new(item.kind, item.value + base),
            _ => item,
        }));
    }
}

/// Builds the transitions array for a fully parsed pattern.
///
/// `dfa_size` is the length the parser computed; the returned array
/// always has exactly that many items, `BEGIN` at index 0 and `END` at
/// the last index.
pub fn generate(stack: &SegmentedStack, dfa_size: i64) -> Vec<Item> {
    let tokens = stack.as_slice();
    let body = compile_alternation(tokens);
    let mut out = Vec::with_capacity(dfa_size as usize);
    out.push(Item::new(ItemKind::Begin, 0));
    out.extend(body.0.into_iter().map(|item| match item.kind {
        ItemKind::Branch | ItemKind::Jump => Item::new(item.kind, item.value + 1),
        _ => item,
    }));
    out.push(Item::new(ItemKind::End, 0));
    debug_assert_eq!(out.len() as i64, dfa_size);
    out
}

/// Splits `tokens` on top-level `Select` items (ones not nested inside a
/// further `OpenBr`/`CloseBr` pair) and compiles each alternative, then
/// chains them with the standard `BRANCH`/`JUMP` ladder: trying
/// alternative `i`, on failure, falls through to the `BRANCH` that tries
/// alternative `i+1`; on success, alternative `i` ends with a `JUMP` past
/// every later alternative to the shared exit. The last alternative
/// needs neither.
fn compile_alternation(tokens: &[Item]) -> Fragment {
    let alternatives = split_on_top_level_select(tokens);
    if alternatives.len() == 1 {
        return compile_sequence(alternatives[0]);
    }

    let mut out: Vec<Item> = Vec::new();
    let mut pending_jumps: Vec<usize> = Vec::new();
    let last = alternatives.len() - 1;
    for (i, alt_tokens) in alternatives.into_iter().enumerate() {
        if i != last {
            let branch_at = out.len();
            out.push(Item::new(ItemKind::Branch, 0));
            let alt = compile_sequence(alt_tokens);
            let base = out.len() as i64;
            out.extend(alt.0.into_iter().map(|item| match item.kind {
                ItemKind::Branch | ItemKind::Jump => Item::new(item.kind, item.value + base),
                _ => item,
            }));
            let jump_at = out.len();
            out.push(Item::new(ItemKind::Jump, 0));
            pending_jumps.push(jump_at);
            let next_alt_start = out.len() as i64;
            out[branch_at].value = next_alt_start;
        } else {
            let alt = compile_sequence(alt_tokens);
            let base = out.len() as i64;
            out.extend(alt.0.into_iter().map(|item| match item.kind {
                ItemKind::Branch | ItemKind::Jump => Item::new(item.kind, item.value + base),
                _ => item,
            }));
        }
    }
    let end = out.len() as i64;
    for idx in pending_jumps {
        out[idx].value = end;
    }
    Fragment(out)
}

/// Splits a balanced token slice on `Select` items at depth 0. A pattern
/// with no top-level `|` at all yields a single "alternative" (the whole
/// slice).
fn split_on_top_level_select(tokens: &[Item]) -> Vec<&[Item]> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, item) in tokens.iter().enumerate() {
        match item.kind {
            ItemKind::OpenBr => depth += 1,
            ItemKind::CloseBr => depth -= 1,
            ItemKind::Select if depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}

/// Compiles one `|`-free sequence of atoms (each optionally followed by
/// `*`/`+`/`?`) into a fragment, concatenating each atom's fragment in
/// order.
fn compile_sequence(tokens: &[Item]) -> Fragment {
    let mut out = Fragment(Vec::new());
    let mut i = 0;
    while i < tokens.len() {
        let (mut atom, next) = compile_atom(tokens, i);
        i = next;
        if let Some(kind) = tokens.get(i).map(|it| it.kind) {
            match kind {
                ItemKind::Asterisk => {
                    atom = apply_star(atom);
                    i += 1;
                }
                ItemKind::Plus => {
                    atom = apply_plus(atom);
                    i += 1;
                }
                ItemKind::Question => {
                    atom = apply_question(atom);
                    i += 1;
                }
                _ => {}
            }
        }
        out.append(atom);
    }
    out
}

/// Compiles the single atom starting at `tokens[i]` (a literal, an id
/// marker, a whole character class, or a parenthesized group), returning
/// its fragment and the index just past it (before any trailing
/// quantifier).
fn compile_atom(tokens: &[Item], i: usize) -> (Fragment, usize) {
    match tokens[i].kind {
        ItemKind::Char | ItemKind::Id => (Fragment::single(tokens[i]), i + 1),
        ItemKind::RngStart => {
            let mut j = i + 1;
            while tokens[j].kind != ItemKind::RngEnd {
                j += 1;
            }
            (Fragment(tokens[i..=j].to_vec()), j + 1)
        }
        ItemKind::OpenBr => {
            let mut depth = 1i32;
            let mut j = i + 1;
            while depth > 0 {
                match tokens[j].kind {
                    ItemKind::OpenBr => depth += 1,
                    ItemKind::CloseBr => depth -= 1,
                    _ => {}
                }
                if depth > 0 {
                    j += 1;
                }
            }
            (compile_alternation(&tokens[i + 1..j]), j + 1)
        }
        other => unreachable!("{:?} cannot start an atom", other),
    }
}

/// `body?`: a forward `BRANCH` over the body, to its first transition
/// past the end.
fn apply_question(body: Fragment) -> Fragment {
    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(Item::new(ItemKind::Branch, 0));
    let base = 1i64;
    out.extend(body.0.into_iter().map(|item| match item.kind {
        ItemKind::Branch | ItemKind::Jump => Item::new(item.kind, item.value + base),
        _ => item,
    }));
    let end = out.len() as i64;
    out[0].value = end;
    Fragment(out)
}

/// `body+`: the body, followed by a backward `BRANCH` to the body's
/// first transition (try again) whose fallthrough exits the loop.
fn apply_plus(body: Fragment) -> Fragment {
    let mut out = Vec::with_capacity(body.len() + 1);
    out.extend(body.0);
    out.push(Item::new(ItemKind::Branch, 0));
    Fragment(out)
}

/// `body*`: a forward `BRANCH` over the body (skip it entirely),
/// followed by the body, followed by a backward `BRANCH` to the body's
/// start (loop) whose fallthrough exits.
fn apply_star(body: Fragment) -> Fragment {
    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(Item::new(ItemKind::Branch, 0));
    let base = 1i64;
    let body_start = 1i64;
    out.extend(body.0.into_iter().map(|item| match item.kind {
        ItemKind::Branch | ItemKind::Jump => Item::new(item.kind, item.value + base),
        _ => item,
    }));
    out.push(Item::new(ItemKind::Branch, body_start));
    let end = out.len() as i64;
    out[0].value = end;
    Fragment(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::CompileFlags;
    use crate::parser::parse;

    fn compile(pattern: &str) -> Vec<Item> {
        let out = parse(pattern, CompileFlags::empty()).unwrap();
        generate(&out.stack, out.dfa_size)
    }

    #[test]
    fn begin_and_end_bookend_every_pattern() {
        let t = compile("abc");
        assert_eq!(t.first().unwrap().kind, ItemKind::Begin);
        assert_eq!(t.last().unwrap().kind, ItemKind::End);
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn literal_concatenation_has_no_branches() {
        let t = compile("abc");
        assert!(t.iter().all(|it| !matches!(it.kind, ItemKind::Branch | ItemKind::Jump)));
        let kinds: Vec<_> = t.iter().map(|it| it.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ItemKind::Begin,
                ItemKind::Char,
                ItemKind::Char,
                ItemKind::Char,
                ItemKind::End
            ]
        );
    }

    #[test]
    fn star_wraps_with_two_branches_targeting_in_bounds_slots() {
        let t = compile("ab*c");
        for (i, item) in t.iter().enumerate() {
            if matches!(item.kind, ItemKind::Branch | ItemKind::Jump) {
                assert!(item.value >= 0 && (item.value as usize) < t.len(), "slot {i} target out of range");
            }
        }
        // Begin, a, [branch-over, b, branch-back], c, End
        assert_eq!(t.len(), 7);
        assert_eq!(t[2].kind, ItemKind::Branch);
        assert_eq!(t[4].kind, ItemKind::Branch);
    }

    #[test]
    fn alternation_targets_stay_in_bounds() {
        let t = compile("a(b|c)d");
        for item in &t {
            if matches!(item.kind, ItemKind::Branch | ItemKind::Jump) {
                assert!((item.value as usize) < t.len());
            }
        }
        let kinds: Vec<_> = t.iter().map(|it| it.kind).collect();
        assert!(kinds.contains(&ItemKind::Branch));
        assert!(kinds.contains(&ItemKind::Jump));
    }

    #[test]
    fn three_way_alternation_uses_two_branch_jump_pairs() {
        let t = compile("a|b|c");
        let branches = t.iter().filter(|it| it.kind == ItemKind::Branch).count();
        let jumps = t.iter().filter(|it| it.kind == ItemKind::Jump).count();
        assert_eq!(branches, 2);
        assert_eq!(jumps, 2);
    }

    #[test]
    fn id_marker_survives_as_a_passthrough_item() {
        let t = compile("a{2!}b");
        let kinds: Vec<_> = t.iter().map(|it| it.kind).collect();
        assert!(kinds.contains(&ItemKind::Id));
    }

    #[test]
    fn question_wraps_with_a_single_forward_branch() {
        let t = compile("ab?c");
        let branches = t.iter().filter(|it| it.kind == ItemKind::Branch).count();
        assert_eq!(branches, 1);
    }

    #[test]
    fn plus_wraps_with_a_single_backward_branch() {
        let t = compile("ab+c");
        let branches = t.iter().filter(|it| it.kind == ItemKind::Branch).count();
        assert_eq!(branches, 1);
        // the branch must point backward, into the body
        let branch = t.iter().position(|it| it.kind == ItemKind::Branch).unwrap();
        assert!((t[branch].value as usize) <= branch);
    }

    #[test]
    fn character_class_copies_through_as_one_atom() {
        let t = compile("[ab]");
        let kinds: Vec<_> = t.iter().map(|it| it.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ItemKind::Begin,
                ItemKind::RngStart,
                ItemKind::RngChar,
                ItemKind::RngChar,
                ItemKind::RngEnd,
                ItemKind::End
            ]
        );
    }
}
