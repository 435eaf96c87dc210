//! Component F, driver half: turns an annotated transitions array into
//! a [`crate::machine::Machine`].
//!
//! For every term (`BEGIN`, `END`, `CHAR`, `RNG_END`) this emits a tiny
//! accept-test subroutine through an [`Emitter`] and, once at compile
//! time, runs [`trace`] from the position right after that term to find
//! every term reachable without consuming another character. Matching a
//! character against a compiled [`crate::machine::Machine`] later never
//! re-derives that reachability. It is baked into
//! [`CompiledTerm::destinations`] up front, the same way the source's
//! JIT never re-walks the stack once code for a term exists.

use crate::emit::interp::{self, InterpEmitter, Program};
use crate::emit::{ArithOp, Cond, Emitter, Operand, Reg};
use crate::item::{Item, ItemKind};
use crate::state::Annotation;
use crate::trace::{new_colors, trace};
use crate::Result;

/// What kind of accept test a term's entry address runs, kept around
/// for diagnostics ([`crate::machine::Machine::describe`]) even though
/// the accept test itself is opaque compiled code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermRole {
    Begin,
    End,
    Char,
    Class,
}

/// A term reachable from another without consuming input, paired with
/// the id color [`crate::trace`] assigned it.
#[derive(Clone, Copy, Debug)]
pub struct Destination {
    pub term_index: usize,
    pub id: i64,
}

/// Everything the runtime needs about one term: how to test whether it
/// accepts the current character, and what becomes active if it does.
pub struct CompiledTerm {
    pub role: TermRole,
    pub entry_addr: usize,
    pub destinations: Vec<Destination>,
}

/// The immutable, compiled representation of a pattern: one accept-test
/// program plus per-term metadata, indexed by `term_index`.
pub struct CompiledPattern {
    pub program: Program,
    pub terms: Vec<CompiledTerm>,
    pub terms_size: usize,
    pub id_check: bool,
    pub begin_term_index: usize,
    pub end_term_index: usize,
    pub max_class_members: usize,
}

/// Compiles `transitions` (already annotated) into a [`CompiledPattern`].
pub fn compile(transitions: &[Item], annotation: &Annotation) -> Result<CompiledPattern> {
    let mut emitter = InterpEmitter::new();
    let mut terms: Vec<CompiledTerm> = Vec::with_capacity(annotation.terms_size);
    let mut colors = new_colors(transitions.len());

    for (pos, slot) in annotation.slots.iter().enumerate() {
        let Some(term_index) = slot.term_index else { continue };
        debug_assert_eq!(terms.len(), term_index, "annotator must assign term_index in array order");

        let item = transitions[pos];
        let (role, entry_addr) = match item.kind {
            ItemKind::Begin => (TermRole::Begin, emit_always_true(&mut emitter)),
            ItemKind::End => (TermRole::End, emit_always_true(&mut emitter)),
            ItemKind::Char => (TermRole::Char, emit_char_test(&mut emitter, item.value)),
            ItemKind::RngEnd => {
                let (invert, members) = class_members(transitions, pos);
                (TermRole::Class, emit_class_test(&mut emitter, invert, &members))
            }
            other => unreachable!("{:?} is not a term kind", other),
        };

        let destinations = if pos + 1 < transitions.len() {
            trace(transitions, &mut colors, pos + 1)
                .into_iter()
                .map(|r| Destination { term_index: annotation.slots[r.position].term_index.expect("trace stops only at terms"), id: r.id })
                .collect()
        } else {
            Vec::new()
        };

        terms.push(CompiledTerm { role, entry_addr, destinations });
    }

    let program = emitter.generate_code()?;
    Ok(CompiledPattern {
        program,
        terms,
        terms_size: annotation.terms_size,
        id_check: annotation.id_check,
        begin_term_index: annotation.begin_term_index,
        end_term_index: annotation.end_term_index,
        max_class_members: annotation.max_class_members,
    })
}

/// `BEGIN`/`END` don't test anything; their entry address exists purely
/// so `terms_size` and the emitted entry count stay equal (testable
/// property 7), and so `CompiledTerm::destinations` has somewhere
/// uniform to hang off of.
fn emit_always_true(e: &mut InterpEmitter) -> usize {
    let addr = e.emit_label();
    e.emit_enter(1, 0, 0, 0);
    e.emit_return(Operand::Imm(1));
    addr
}

fn emit_char_test(e: &mut InterpEmitter, literal: i64) -> usize {
    let addr = e.emit_label();
    e.emit_enter(1, 0, 0, 0);
    e.emit_op2(ArithOp::Sub, true, Operand::Reg(Reg::T1), Operand::Reg(Reg::T0), Operand::Imm(literal as isize));
    let reject = e.emit_jump(Cond::NotEqual);
    e.emit_return(Operand::Imm(1));
    let reject_label = e.emit_label();
    e.set_label(reject, reject_label);
    e.emit_return(Operand::Imm(0));
    addr
}

enum Member {
    Char(i64),
    Range(i64, i64),
}

/// Walks backward from a `RNG_END` at `end_pos` to collect its class's
/// invert flag and members, in source order.
fn class_members(transitions: &[Item], end_pos: usize) -> (bool, Vec<Member>) {
    let mut start = end_pos;
    while transitions[start].kind != ItemKind::RngStart {
        start -= 1;
    }
    let invert = transitions[start].value != 0;
    let mut members = Vec::new();
    let mut i = start + 1;
    while i < end_pos {
        match transitions[i].kind {
            ItemKind::RngChar => {
                members.push(Member::Char(transitions[i].value));
                i += 1;
            }
            ItemKind::RngLeft => {
                let lo = transitions[i].value;
                let hi = transitions[i + 1].value;
                members.push(Member::Range(lo, hi));
                i += 2;
            }
            other => unreachable!("{:?} cannot appear inside a character class", other),
        }
    }
    (invert, members)
}

fn emit_class_test(e: &mut InterpEmitter, invert: bool, members: &[Member]) -> usize {
    e.emit_enter(1, 0, 0, 0);
    let addr = e.emit_label();
    let mut accept_sites = Vec::new();
    for member in members {
        match *member {
            Member::Char(c) => {
                e.emit_op2(ArithOp::Sub, true, Operand::Reg(Reg::T1), Operand::Reg(Reg::T0), Operand::Imm(c as isize));
                accept_sites.push(e.emit_jump(Cond::Equal));
            }
            Member::Range(lo, hi) => {
                e.emit_op2(ArithOp::Sub, true, Operand::Reg(Reg::T1), Operand::Reg(Reg::T0), Operand::Imm(lo as isize));
                let skip_low = e.emit_jump(Cond::Less);
                e.emit_op2(ArithOp::Sub, true, Operand::Reg(Reg::T1), Operand::Reg(Reg::T0), Operand::Imm(hi as isize));
                let skip_high = e.emit_jump(Cond::Greater);
                accept_sites.push(e.emit_jump(Cond::Always));
                let past = e.emit_label();
                e.set_label(skip_low, past);
                e.set_label(skip_high, past);
            }
        }
    }
    // No member matched.
    e.emit_return(Operand::Imm(if invert { 1 } else { 0 }));
    let accept_label = e.emit_label();
    for site in accept_sites {
        e.set_label(site, accept_label);
    }
    e.emit_return(Operand::Imm(if invert { 0 } else { 1 }));
    addr
}

/// Runs the accept test for `term`'s entry address against `c`.
pub fn accepts(program: &Program, term: &CompiledTerm, c: i64) -> bool {
    let mut heap: [isize; 0] = [];
    interp::run(program, term.entry_addr, c as isize, &mut heap) != 0
}
