//! Component F, collaborator half: the `Emitter` trait.
//!
//! The source emits native machine code directly through sljit, a
//! portable assembler with one instruction set abstracting over six
//! architectures. There is no safe equivalent to "write executable
//! bytes and jump into them" in ordinary Rust, so this crate keeps the
//! same seam (a small, typed instruction set a backend turns into
//! something runnable), but ships exactly one backend: a bytecode
//! interpreter ([`interp`]) that never leaves Rust's memory-safety
//! guarantees. `compile` drives an `Emitter` to build the per-term
//! character-accept tests (the one piece of the pipeline that is
//! genuinely "run this tiny subroutine against one input value" and
//! nothing else); the rest of a term's behavior (linking it into the
//! active list, propagating `best_begin`/`best_id`) is ordinary data
//! threaded by [`crate::regex_match`], since that bookkeeping is about
//! shared, mutable state arrays and gains nothing from being expressed
//! as register code.

pub mod interp;

/// A register in the emitter's small, fixed file: three scratch
/// registers and five callee-saved ones, mirroring the source's
/// `SLJIT_R*`/`SLJIT_S*` split between registers a call may clobber and
/// ones it must preserve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg {
    T0,
    T1,
    T2,
    S0,
    S1,
    S2,
    S3,
    S4,
}

/// The condition a conditional jump tests, evaluated against the flags
/// left by the most recent flag-setting `op2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cond {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Always,
}

/// The width a `op1` move reads or writes at its memory operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovWidth {
    Word,
    U8,
    U16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
}

/// An instruction operand: a register, an immediate, or a memory
/// reference. Memory operands index a flat `isize` heap by position
/// rather than holding a raw pointer, so an `Emitter` backend can stay
/// entirely safe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    Reg(Reg),
    Imm(isize),
    Mem { base: Reg, disp: isize },
    MemIndexed { base: Reg, index: Reg, scale: usize, disp: isize },
}

/// A resolved instruction address, returned by [`Emitter::emit_label`].
pub type Label = usize;

/// A not-yet-resolved jump, returned by [`Emitter::emit_jump`] and
/// resolved later with [`Emitter::set_label`].
pub type JumpSite = usize;

/// The code-generation surface the compile driver targets. One
/// implementation ships with this crate ([`interp::InterpEmitter`]); the
/// trait exists so the driver's logic does not have to know it is
/// targeting an interpreter rather than native code.
pub trait Emitter {
    /// The artifact [`Emitter::generate_code`] produces: whatever a
    /// [`crate::machine::Machine`] needs to actually run a compiled
    /// subroutine later.
    type Code;

    /// Opens a subroutine taking `args` word arguments, preserving
    /// `saved_regs` callee-saved registers, using `scratch_regs` scratch
    /// registers, with `locals` bytes of local storage.
    fn emit_enter(&mut self, args: u8, saved_regs: u8, scratch_regs: u8, locals: usize);

    /// Returns `src` from the current subroutine.
    fn emit_return(&mut self, src: Operand);

    /// Marks the current position as a jump target, returning a handle
    /// to it.
    fn emit_label(&mut self) -> Label;

    /// Emits a conditional (or, with [`Cond::Always`], unconditional)
    /// jump to a target resolved later via [`Emitter::set_label`].
    fn emit_jump(&mut self, cond: Cond) -> JumpSite;

    /// Resolves a previously emitted jump to `label`.
    fn set_label(&mut self, jump: JumpSite, label: Label);

    /// An indirect jump to a runtime-computed address.
    fn emit_ijump(&mut self, target: Operand);

    /// `dst = src`, truncated/extended per `width`.
    fn emit_op1(&mut self, width: MovWidth, dst: Operand, src: Operand);

    /// `dst = src1 op src2`; when `set_flags`, also updates the flags a
    /// following conditional jump tests.
    fn emit_op2(&mut self, op: ArithOp, set_flags: bool, dst: Operand, src1: Operand, src2: Operand);

    /// The resolved address of `label`, once known.
    fn label_addr(&self, label: Label) -> usize;

    /// Finishes emission, handing back the runnable artifact.
    fn generate_code(self) -> crate::Result<Self::Code>;
}
