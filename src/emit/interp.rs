//! The one backend that implements [`crate::emit::Emitter`]: a small
//! bytecode recorder plus the interpreter that runs its output.
//!
//! Every subroutine a [`crate::compile`] driver builds ends up as a run
//! of [`Instr`]s in one shared [`Program`]; `entry_addrs` in
//! [`crate::machine::Machine`] are just indices into that one
//! instruction stream.

use crate::emit::{ArithOp, Cond, Emitter, JumpSite, Label, MovWidth, Operand, Reg};
use crate::{Error, Result};

#[derive(Clone, Copy, Debug)]
enum Instr {
    Enter,
    Return(Operand),
    Jump { cond: Cond, target: usize },
    IJump(Operand),
    Op1 { width: MovWidth, dst: Operand, src: Operand },
    Op2 { op: ArithOp, set_flags: bool, dst: Operand, src1: Operand, src2: Operand },
}

/// A flat, already-linked instruction stream. Every [`JumpSite`]'s
/// target has been patched to an absolute instruction index by the time
/// [`InterpEmitter::generate_code`] returns one.
#[derive(Clone, Debug, Default)]
pub struct Program {
    instrs: Vec<Instr>,
}

/// Records [`Emitter`] calls into a [`Program`]. `generate_code`
/// verifies every jump site was resolved before handing the program
/// back. An unresolved jump would be a bug in the driver, not a
/// recoverable compile error, so it is a `debug_assert`, not an `Error`.
#[derive(Default)]
pub struct InterpEmitter {
    instrs: Vec<Instr>,
}

impl InterpEmitter {
    pub fn new() -> Self {
        InterpEmitter::default()
    }
}

impl Emitter for InterpEmitter {
    type Code = Program;

    fn emit_enter(&mut self, _args: u8, _saved_regs: u8, _scratch_regs: u8, _locals: usize) {
        self.instrs.push(Instr::Enter);
    }

    fn emit_return(&mut self, src: Operand) {
        self.instrs.push(Instr::Return(src));
    }

    fn emit_label(&mut self) -> Label {
        self.instrs.len()
    }

    fn emit_jump(&mut self, cond: Cond) -> JumpSite {
        let site = self.instrs.len();
        self.instrs.push(Instr::Jump { cond, target: usize::MAX });
        site
    }

    fn set_label(&mut self, jump: JumpSite, label: Label) {
        if let Instr::Jump { target, .. } = &mut self.instrs[jump] {
            *target = label;
        } else {
            debug_assert!(false, "set_label called on a non-jump instruction");
        }
    }

    fn emit_ijump(&mut self, target: Operand) {
        self.instrs.push(Instr::IJump(target));
    }

    fn emit_op1(&mut self, width: MovWidth, dst: Operand, src: Operand) {
        self.instrs.push(Instr::Op1 { width, dst, src });
    }

    fn emit_op2(&mut self, op: ArithOp, set_flags: bool, dst: Operand, src1: Operand, src2: Operand) {
        self.instrs.push(Instr::Op2 { op, set_flags, dst, src1, src2 });
    }

    fn label_addr(&self, label: Label) -> usize {
        label
    }

    fn generate_code(self) -> Result<Program> {
        for instr in &self.instrs {
            if let Instr::Jump { target, .. } = instr {
                debug_assert_ne!(*target, usize::MAX, "a jump site was never resolved with set_label");
            }
        }
        Ok(Program { instrs: self.instrs })
    }
}

/// Runtime register file plus the one flag the interpreter's
/// `set_flags` op2 variants maintain: the signed difference of the most
/// recent comparison, the same "compare via subtract" convention real
/// flag registers use.
struct Cpu {
    regs: [isize; 8],
    last_cmp: isize,
}

fn reg_index(r: Reg) -> usize {
    match r {
        Reg::T0 => 0,
        Reg::T1 => 1,
        Reg::T2 => 2,
        Reg::S0 => 3,
        Reg::S1 => 4,
        Reg::S2 => 5,
        Reg::S3 => 6,
        Reg::S4 => 7,
    }
}

impl Cpu {
    fn read(&self, heap: &[isize], op: Operand) -> isize {
        match op {
            Operand::Reg(r) => self.regs[reg_index(r)],
            Operand::Imm(v) => v,
            Operand::Mem { base, disp } => {
                let idx = self.regs[reg_index(base)] + disp as isize;
                heap[idx as usize]
            }
            Operand::MemIndexed { base, index, scale, disp } => {
                let idx = self.regs[reg_index(base)] + self.regs[reg_index(index)] * scale as isize + disp as isize;
                heap[idx as usize]
            }
        }
    }

    fn write(&mut self, heap: &mut [isize], op: Operand, width: MovWidth, value: isize) {
        let truncated = match width {
            MovWidth::Word => value,
            MovWidth::U8 => (value as u8) as isize,
            MovWidth::U16 => (value as u16) as isize,
        };
        match op {
            Operand::Reg(r) => self.regs[reg_index(r)] = truncated,
            Operand::Mem { base, disp } => {
                let idx = self.regs[reg_index(base)] + disp as isize;
                heap[idx as usize] = truncated;
            }
            Operand::MemIndexed { base, index, scale, disp } => {
                let idx = self.regs[reg_index(base)] + self.regs[reg_index(index)] * scale as isize + disp as isize;
                heap[idx as usize] = truncated;
            }
            Operand::Imm(_) => debug_assert!(false, "cannot write to an immediate operand"),
        }
    }

    fn cond_holds(&self, cond: Cond) -> bool {
        match cond {
            Cond::Always => true,
            Cond::Equal => self.last_cmp == 0,
            Cond::NotEqual => self.last_cmp != 0,
            Cond::Less => self.last_cmp < 0,
            Cond::LessEqual => self.last_cmp <= 0,
            Cond::Greater => self.last_cmp > 0,
            Cond::GreaterEqual => self.last_cmp >= 0,
        }
    }
}

/// Runs the subroutine starting at `entry` with a single word argument
/// in `T0`, against `heap` for any `Mem`/`MemIndexed` operands, and
/// returns its `emit_return` value. Every accept-test subroutine this
/// crate emits takes exactly one argument and returns `0` or `1`, but
/// the interpreter itself has no opinion on that convention.
pub fn run(program: &Program, entry: usize, arg: isize, heap: &mut [isize]) -> isize {
    let mut cpu = Cpu { regs: [0; 8], last_cmp: 0 };
    cpu.regs[reg_index(Reg::T0)] = arg;
    let mut pc = entry;
    loop {
        match program.instrs[pc] {
            Instr::Enter => {
                pc += 1;
            }
            Instr::Return(src) => return cpu.read(heap, src),
            Instr::Jump { cond, target } => {
                pc = if cpu.cond_holds(cond) { target } else { pc + 1 };
            }
            Instr::IJump(target) => {
                pc = cpu.read(heap, target) as usize;
            }
            Instr::Op1 { width, dst, src } => {
                let v = cpu.read(heap, src);
                cpu.write(heap, dst, width, v);
                pc += 1;
            }
            Instr::Op2 { op, set_flags, dst, src1, src2 } => {
                let a = cpu.read(heap, src1);
                let b = cpu.read(heap, src2);
                let result = match op {
                    ArithOp::Add => a.wrapping_add(b),
                    ArithOp::Sub => a.wrapping_sub(b),
                    ArithOp::Mul => a.wrapping_mul(b),
                };
                if set_flags {
                    cpu.last_cmp = a.wrapping_sub(b);
                }
                cpu.write(heap, dst, MovWidth::Word, result);
                pc += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{Cond, Emitter, Operand, Reg};

    #[test]
    fn literal_equality_subroutine_accepts_only_the_matching_char() {
        let mut e = InterpEmitter::new();
        e.emit_enter(1, 0, 0, 0);
        e.emit_op2(ArithOp::Sub, true, Operand::Reg(Reg::T1), Operand::Reg(Reg::T0), Operand::Imm('x' as isize));
        let reject = e.emit_jump(Cond::NotEqual);
        e.emit_return(Operand::Imm(1));
        let reject_label = e.emit_label();
        e.set_label(reject, reject_label);
        e.emit_return(Operand::Imm(0));
        let program = e.generate_code().unwrap();

        let mut heap = [];
        assert_eq!(run(&program, 0, 'x' as isize, &mut heap), 1);
        assert_eq!(run(&program, 0, 'y' as isize, &mut heap), 0);
    }

    #[test]
    fn unconditional_jump_skips_the_rejecting_return() {
        let mut e = InterpEmitter::new();
        e.emit_enter(1, 0, 0, 0);
        let always = e.emit_jump(Cond::Always);
        e.emit_return(Operand::Imm(0));
        let target = e.emit_label();
        e.set_label(always, target);
        e.emit_return(Operand::Imm(1));
        let program = e.generate_code().unwrap();

        let mut heap = [];
        assert_eq!(run(&program, 0, 0, &mut heap), 1);
    }
}
