use bitflags::bitflags;

bitflags! {
    /// Compile-time configuration flags.
    ///
    /// Mirrors the source's `REGEX_MATCH_*` / `REGEX_NEWLINE` `#define`s.
    /// `ID_CHECK` has no public bit: the parser raises it internally the
    /// moment it sees a `{n!}` with `n > 0`, and it is exposed only via
    /// [`crate::Machine::id_check`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CompileFlags: u32 {
        /// Anchor the match to the start of the input: `^` semantics for
        /// the whole pattern, not just when a literal `^` is written.
        const MATCH_BEGIN = 1 << 0;
        /// Require the match to reach the end of all consumed input.
        const MATCH_END = 1 << 1;
        /// Prefer the shortest match at a given begin instead of the
        /// longest.
        const MATCH_NON_GREEDY = 1 << 2;
        /// `.` and negated classes exclude `\n` and `\r` as members.
        const NEWLINE = 1 << 3;
        /// Compile in the `verbose` trace dump (requires the `verbose`
        /// crate feature; the flag is accepted either way but is a no-op
        /// without it).
        const MATCH_VERBOSE = 1 << 4;
    }
}

impl Default for CompileFlags {
    fn default() -> Self {
        CompileFlags::empty()
    }
}

/// Width of a character in the pattern and in the scanned input.
///
/// Chosen once at compile time, shared by pattern and input: the source
/// never mixes 8-bit and 16-bit code units within one machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodeUnit {
    U8,
    U16,
}

impl Default for CodeUnit {
    fn default() -> Self {
        CodeUnit::U8
    }
}
