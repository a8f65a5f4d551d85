use alloc::string::String;

/// which kind of address-like operand is being rendered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature="use-serde", derive(Serialize, Deserialize))]
pub enum SymbolKind {
    /// `B` / `BL` target.
    Branch,
    /// `ADD Rd, pc, #imm`
    AddPcRelative,
    /// `SUB Rd, pc, #imm`
    SubPcRelative,
    /// `LDR Rd, [pc, #offset]`
    LoadPcRelative,
    /// `STR Rd, [pc, #offset]`
    StorePcRelative,
    /// `LDR Rd, [Rn, #offset]` or `LDR Rd, [Rn], #offset`
    Load,
    /// `STR Rd, [Rn, #offset]` or `STR Rd, [Rn], #offset`
    Store,
}

impl SymbolKind {
    pub fn is_pc_relative(&self) -> bool {
        match self {
            SymbolKind::Load |
            SymbolKind::Store => false,
            _ => true,
        }
    }
}

/// everything a symbolicator gets to look at for one operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature="use-serde", derive(Serialize, Deserialize))]
pub struct SymbolEvent {
    pub kind: SymbolKind,
    /// signed displacement; zero for branches, where only `address` matters.
    pub offset: i32,
    /// the resolved target for branches and pc-relative kinds, zero for `Load` and `Store`.
    pub address: u32,
    /// the instruction word being rendered.
    pub word: u32,
}

/// what a symbolicator did with an operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoration {
    /// render this text in place of the numeric operand.
    Decorated(String),
    /// no symbol covers this operand; the numeric form is written instead.
    Undecorated,
}

/// resolves operands to symbolic text.
///
/// for `Load` and `Store` events the text lands directly after the `#` of an immediate offset,
/// so `sym+4` renders as `[r1, #sym+4]`. for every other kind the text replaces the whole
/// operand. a symbolicator is free to do as much lookup work as it likes, but can only reach the
/// output through the `Decoration` it returns.
pub trait Symbolicator {
    fn symbolicate(&mut self, event: &SymbolEvent) -> Decoration;
}

impl<F: FnMut(&SymbolEvent) -> Decoration> Symbolicator for F {
    fn symbolicate(&mut self, event: &SymbolEvent) -> Decoration {
        self(event)
    }
}

/// declines every event, so every operand renders numerically.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoSymbols;

impl Symbolicator for NoSymbols {
    fn symbolicate(&mut self, _event: &SymbolEvent) -> Decoration {
        Decoration::Undecorated
    }
}
