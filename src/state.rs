//! Component D: the search-state annotator.
//!
//! A single forward pass over the transitions array that assigns each
//! `BEGIN`/`END`/`CHAR`/`RNG_END` a dense `term_index`, and collects the
//! handful of facts the rest of the pipeline needs about the pattern as a
//! whole (whether any `{n!}` tag can ever fire, and how large the state
//! arrays need to be).

use crate::item::{Item, ItemKind};

/// Per-transitions-slot bookkeeping. Most slots (branches, jumps, class
/// members, id markers) carry no term index and are never looked up by
/// one; only the four term kinds get a `Some`.
#[derive(Clone, Copy, Debug)]
pub struct SlotInfo {
    pub term_index: Option<usize>,
}

/// The result of annotating a transitions array: one [`SlotInfo`] per
/// slot plus the pattern-wide facts the emitter and runtime need.
#[derive(Debug)]
pub struct Annotation {
    pub slots: Vec<SlotInfo>,
    pub terms_size: usize,
    /// Set when any `{n!}` in the pattern has `n > 0`: the runtime must
    /// track `best_id` at all.
    pub id_check: bool,
    pub begin_term_index: usize,
    pub end_term_index: usize,
    /// The longest run of `RNG_CHAR`/`RNG_LEFT`-paired members across
    /// every character class in the pattern. Sizes a scratch buffer the
    /// interpreter backend's class-compare code reuses per match.
    pub max_class_members: usize,
}

pub fn annotate(transitions: &[Item]) -> Annotation {
    let mut slots = Vec::with_capacity(transitions.len());
    let mut terms_size = 0usize;
    let mut id_check = false;
    let mut begin_term_index = 0usize;
    let mut end_term_index = 0usize;
    let mut max_class_members = 0usize;

    let mut i = 0usize;
    while i < transitions.len() {
        let item = transitions[i];
        match item.kind {
            ItemKind::Begin => {
                begin_term_index = terms_size;
                slots.push(SlotInfo { term_index: Some(terms_size) });
                terms_size += 1;
                i += 1;
            }
            ItemKind::End => {
                end_term_index = terms_size;
                slots.push(SlotInfo { term_index: Some(terms_size) });
                terms_size += 1;
                i += 1;
            }
            ItemKind::Char => {
                slots.push(SlotInfo { term_index: Some(terms_size) });
                terms_size += 1;
                i += 1;
            }
            ItemKind::RngStart => {
                // Everything up to the matching RNG_END is one class;
                // only RNG_END gets a term index, but we still need to
                // walk the members to size the compare-chain scratch.
                let mut j = i + 1;
                let mut members = 0usize;
                while transitions[j].kind != ItemKind::RngEnd {
                    match transitions[j].kind {
                        ItemKind::RngChar => {
                            members += 1;
                            j += 1;
                        }
                        ItemKind::RngLeft => {
                            members += 1;
                            j += 2; // RngLeft, RngRight
                        }
                        _ => unreachable!("character class member expected"),
                    }
                }
                max_class_members = max_class_members.max(members);
                for _ in i..j {
                    slots.push(SlotInfo { term_index: None });
                }
                slots.push(SlotInfo { term_index: Some(terms_size) });
                terms_size += 1;
                i = j + 1;
            }
            ItemKind::Id => {
                if item.value > 0 {
                    id_check = true;
                }
                slots.push(SlotInfo { term_index: None });
                i += 1;
            }
            ItemKind::Branch | ItemKind::Jump => {
                slots.push(SlotInfo { term_index: None });
                i += 1;
            }
            ItemKind::RngEnd | ItemKind::RngChar | ItemKind::RngLeft | ItemKind::RngRight => {
                unreachable!("consumed as part of the enclosing RNG_START run")
            }
            ItemKind::OpenBr | ItemKind::CloseBr | ItemKind::Select | ItemKind::Asterisk | ItemKind::Plus | ItemKind::Question => {
                unreachable!("{:?} cannot appear in a generated transitions array", item.kind)
            }
        }
    }

    Annotation {
        slots,
        terms_size,
        id_check,
        begin_term_index,
        end_term_index,
        max_class_members,
    }
}
