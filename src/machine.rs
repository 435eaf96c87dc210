//! The compiled, immutable half of the engine: running a pattern through
//! all five pipeline stages (§2) produces a [`Machine`], which [`crate::Match`]
//! objects are then spawned from to actually scan input.

use bon::bon;

use crate::compile::{self, CompiledTerm, TermRole};
use crate::emit::interp::Program;
use crate::error::{Error, Result};
use crate::flags::{CodeUnit, CompileFlags};
use crate::parser;
use crate::prefilter::Prefilter;
use crate::state::{self, Annotation};
use crate::transitions;

/// The compiled representation of a pattern: immutable after
/// [`Machine::compile`] returns, and safely shared by any number of
/// concurrently running [`crate::Match`] objects (§5): each owns its
/// own state arrays, and nothing here is ever mutated post-construction.
///
/// Corresponds to the distilled spec's "Machine object" (§3) and to
/// `regex_compile`/`regex_free_machine` (§6). `compile` is the
/// constructor, and an explicit `free_machine` has no counterpart here:
/// `Program` is an ordinary `Vec`-backed value with nothing to release
/// by hand, so the derived `Drop` glue already does the right thing.
pub struct Machine {
    program: Program,
    terms: Vec<CompiledTerm>,
    terms_size: usize,
    id_check: bool,
    begin_term_index: usize,
    end_term_index: usize,
    max_class_members: usize,
    /// `no_states` as defined in §3: 2 plus one slot for `start` unless
    /// `MATCH_BEGIN` is set, plus one more for `id` when both apply.
    /// Diagnostic only here: every [`crate::regex_match::Match`] state
    /// row carries all four fields unconditionally, trading the
    /// source's per-configuration row-width tuning for one fixed,
    /// memory-safe `Slot` shape (see `DESIGN.md`).
    no_states: u8,
    flags: CompileFlags,
    code_unit: CodeUnit,
    prefilter: Option<Prefilter>,
}

#[bon]
impl Machine {
    /// Compiles `pattern` under `flags` into a [`Machine`]. This is
    /// component pipeline stages A through F end to end: parse (B),
    /// generate transitions (C), annotate search state (D), then drive
    /// the code emitter (F, using the trace helper E internally).
    ///
    /// # Example
    /// ```
    /// use regexjit::{CompileFlags, Machine};
    ///
    /// let machine = Machine::builder("ab*c").build().unwrap();
    /// let mut m = machine.new_match().unwrap();
    /// m.continue_match(b"xyabbbcz");
    /// let result = m.result().unwrap();
    /// assert_eq!((result.begin, result.end), (2, 7));
    /// ```
    #[builder]
    pub fn compile(
        #[builder(start_fn)] pattern: &str,
        #[builder(default)] code_unit: CodeUnit,
        #[builder(default)] flags: CompileFlags,
    ) -> Result<Machine> {
        let parsed = parser::parse(pattern, flags)?;
        let transitions = transitions::generate(&parsed.stack, parsed.dfa_size);
        let annotation = state::annotate(&transitions);
        let flags = parsed.flags;

        let compiled = compile::compile(&transitions, &annotation)?;

        let term_positions = term_positions(&annotation);
        let prefilter = build_prefilter(&transitions, &term_positions, &compiled.terms, annotation.begin_term_index, &flags);

        let no_states = 2 + u8::from(!flags.contains(CompileFlags::MATCH_BEGIN))
            + u8::from(annotation.id_check && !flags.contains(CompileFlags::MATCH_BEGIN));

        Ok(Machine {
            program: compiled.program,
            terms: compiled.terms,
            terms_size: compiled.terms_size,
            id_check: compiled.id_check,
            begin_term_index: compiled.begin_term_index,
            end_term_index: compiled.end_term_index,
            max_class_members: compiled.max_class_members,
            no_states,
            flags,
            code_unit,
            prefilter,
        })
    }
}

#[cfg(feature = "perf-fast-forward")]
fn build_prefilter(
    transitions: &[crate::item::Item],
    term_positions: &[usize],
    terms: &[CompiledTerm],
    begin_term_index: usize,
    flags: &CompileFlags,
) -> Option<Prefilter> {
    if flags.contains(CompileFlags::MATCH_BEGIN) {
        return None;
    }
    Prefilter::build(transitions, term_positions, &terms[begin_term_index])
}

#[cfg(not(feature = "perf-fast-forward"))]
fn build_prefilter(
    _transitions: &[crate::item::Item],
    _term_positions: &[usize],
    _terms: &[CompiledTerm],
    _begin_term_index: usize,
    _flags: &CompileFlags,
) -> Option<Prefilter> {
    None
}

fn term_positions(annotation: &Annotation) -> Vec<usize> {
    let mut positions = vec![0usize; annotation.terms_size];
    for (pos, slot) in annotation.slots.iter().enumerate() {
        if let Some(t) = slot.term_index {
            positions[t] = pos;
        }
    }
    positions
}

impl Machine {
    /// Spawns a fresh [`crate::Match`] against this machine, or `None` on
    /// allocation failure (the only way `begin_match` can fail, §6).
    pub fn new_match(&self) -> Option<crate::regex_match::Match<'_>> {
        crate::regex_match::Match::new(self)
    }

    pub fn flags(&self) -> CompileFlags {
        self.flags
    }

    pub fn code_unit(&self) -> CodeUnit {
        self.code_unit
    }

    /// Whether any `{n!}` with `n > 0` appears in the pattern; the
    /// internally derived `ID_CHECK` flag (§6).
    pub fn id_check(&self) -> bool {
        self.id_check
    }

    pub fn terms_size(&self) -> usize {
        self.terms_size
    }

    /// `no_states` per §3: the per-slot row width the source's hand
    /// rolled state arrays would use for this machine's flags. Exposed
    /// for diagnostics; this crate's own state rows don't vary in width.
    pub fn no_states(&self) -> u8 {
        self.no_states
    }

    pub(crate) fn program(&self) -> &Program {
        &self.program
    }

    pub(crate) fn terms(&self) -> &[CompiledTerm] {
        &self.terms
    }

    pub(crate) fn begin_term_index(&self) -> usize {
        self.begin_term_index
    }

    pub(crate) fn end_term_index(&self) -> usize {
        self.end_term_index
    }

    pub(crate) fn max_class_members(&self) -> usize {
        self.max_class_members
    }

    pub(crate) fn prefilter(&self) -> Option<&Prefilter> {
        self.prefilter.as_ref()
    }

    pub(crate) fn term_role(&self, term_index: usize) -> TermRole {
        self.terms[term_index].role
    }
}

#[cfg(feature = "verbose")]
impl core::fmt::Debug for Machine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Machine")
            .field("terms_size", &self.terms_size)
            .field("id_check", &self.id_check)
            .field("begin_term_index", &self.begin_term_index)
            .field("end_term_index", &self.end_term_index)
            .field("no_states", &self.no_states)
            .field("flags", &self.flags)
            .finish()
    }
}
