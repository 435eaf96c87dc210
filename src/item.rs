/// The tag half of the tagged (kind, value) item shared by the parser
/// stack and the transitions array.
///
/// One enum serves both stages rather than two near-identical types: the
/// transition generator reads parser-stage kinds (`Char`, `OpenBr`, ...)
/// and writes generator-stage kinds (`Branch`, `Jump`) into the very same
/// slot shape, so keeping them in one tag makes that handoff a plain
/// in-place rewrite instead of a conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Start-of-input anchor. Always occupies transitions[0].
    Begin,
    /// End-of-input anchor. Always the last transitions slot.
    End,
    /// A literal character to match. `value` is the code point.
    Char,
    /// An `{n!}` id marker. `value` is the id (`> 0` raises `ID_CHECK`).
    Id,
    /// Opens a character class. `value` is 1 for `[^...]`, 0 for `[...]`.
    RngStart,
    /// Closes a character class.
    RngEnd,
    /// A single member of a character class. `value` is the code point.
    RngChar,
    /// Low end of a `lo-hi` class range. `value` is the low code point.
    RngLeft,
    /// High end of a `lo-hi` class range. `value` is the high code point.
    RngRight,
    /// A forward branch. `value` is the target index in the transitions
    /// array. Only ever appears in the transitions array, never on the
    /// parser stack.
    Branch,
    /// An unconditional jump. `value` is the target index. Only ever
    /// appears in the transitions array.
    Jump,
    /// Opens a group (parenthesized, or synthesized by unrolling).
    OpenBr,
    /// Closes a group.
    CloseBr,
    /// An alternation (`|`) marker.
    Select,
    /// A `*` quantifier.
    Asterisk,
    /// A `+` quantifier.
    Plus,
    /// A `?` quantifier.
    Question,
}

impl ItemKind {
    /// The per-item contribution to `dfa_size`, the transitions array's
    /// final length, counted at the moment the item is pushed (or, for
    /// unrolled repetitions, recomputed over a duplicated range).
    pub(crate) fn dfa_size_weight(self) -> i64 {
        match self {
            ItemKind::Asterisk | ItemKind::Select => 2,
            ItemKind::OpenBr | ItemKind::CloseBr => 0,
            ItemKind::Begin | ItemKind::End => 1,
            _ => 1,
        }
    }

    /// True for the four kinds the search-state annotator assigns a
    /// `term_index` to.
    pub(crate) fn is_term(self) -> bool {
        matches!(
            self,
            ItemKind::Begin | ItemKind::End | ItemKind::Char | ItemKind::RngEnd
        )
    }
}

/// A single tagged item: a `kind` and an integer `value` whose meaning
/// depends on the kind (a character code, an id, or a transitions-array
/// index for `Branch`/`Jump`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Item {
    pub kind: ItemKind,
    pub value: i64,
}

impl Item {
    pub const fn new(kind: ItemKind, value: i64) -> Self {
        Item { kind, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dfa_size_weights_match_parser_rules() {
        assert_eq!(ItemKind::Char.dfa_size_weight(), 1);
        assert_eq!(ItemKind::Asterisk.dfa_size_weight(), 2);
        assert_eq!(ItemKind::Select.dfa_size_weight(), 2);
        assert_eq!(ItemKind::OpenBr.dfa_size_weight(), 0);
        assert_eq!(ItemKind::CloseBr.dfa_size_weight(), 0);
    }

    #[test]
    fn term_kinds() {
        assert!(ItemKind::Begin.is_term());
        assert!(ItemKind::End.is_term());
        assert!(ItemKind::Char.is_term());
        assert!(ItemKind::RngEnd.is_term());
        assert!(!ItemKind::RngStart.is_term());
        assert!(!ItemKind::OpenBr.is_term());
    }
}
