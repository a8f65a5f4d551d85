//! Manual references in this module are with respect to the ARM Architecture Reference Manual,
//! issue E (`ARM DDI 0100E`), which covers the v4 and v5 instruction sets this decoder handles.
//!
//! Decoding is split in two: `decode` turns a word into an `Instruction` with no knowledge of
//! where it lives, and `display` renders that `Instruction` at an address, consulting a
//! `Symbolicator` for anything pc-relative or offset-like.

use core::fmt::{self, Display, Formatter};

use yaxpeax_arch::{AddressDiff, Arch, Decoder, LengthedInstruction, ReadError, Reader};

mod config;
mod decode;
mod disassembler;
mod display;
mod extension;
mod symbols;

pub use self::config::DisplayConfig;
pub use self::decode::decode_word;
pub use self::disassembler::{Disassembler, DisassemblyError, Listing, ListingLine};
pub use self::display::write_mnemonic;
pub use self::extension::ExtensionDecoder;
pub use self::symbols::{Decoration, NoSymbols, SymbolEvent, SymbolKind, Symbolicator};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Opcode {
    /// not an instruction this decoder will render; shown as the raw word.
    DCD,

    AND,
    EOR,
    SUB,
    RSB,
    ADD,
    ADC,
    SBC,
    RSC,
    TST,
    TEQ,
    CMP,
    CMN,
    ORR,
    MOV,
    BIC,
    MVN,

    MUL,
    MLA,
    UMULL,
    UMLAL,
    SMULL,
    SMLAL,

    /*
     * single and halfword transfers carry `(add, pre, wback)`. a post-indexed word or byte
     * transfer with `wback` set is the user-mode `T` form.
     */
    LDR(bool, bool, bool),
    STR(bool, bool, bool),
    LDRB(bool, bool, bool),
    STRB(bool, bool, bool),
    LDRH(bool, bool, bool),
    STRH(bool, bool, bool),
    LDRSB(bool, bool, bool),
    LDRSH(bool, bool, bool),

    /// `(add, pre, wback, usermode)`
    LDM(bool, bool, bool, bool),
    /// `(add, pre, wback, usermode)`
    STM(bool, bool, bool, bool),

    SWP,
    SWPB,
    B,
    BL,
    BX,
    BLX,
    SWI,
    CLZ,
    MRS,
    MSR,
}

impl Opcode {
    /// the upper-case base mnemonic, before any `S`, condition or suffix is attached.
    pub fn name(&self) -> &'static str {
        match self {
            Opcode::DCD => "DCD",
            Opcode::AND => "AND",
            Opcode::EOR => "EOR",
            Opcode::SUB => "SUB",
            Opcode::RSB => "RSB",
            Opcode::ADD => "ADD",
            Opcode::ADC => "ADC",
            Opcode::SBC => "SBC",
            Opcode::RSC => "RSC",
            Opcode::TST => "TST",
            Opcode::TEQ => "TEQ",
            Opcode::CMP => "CMP",
            Opcode::CMN => "CMN",
            Opcode::ORR => "ORR",
            Opcode::MOV => "MOV",
            Opcode::BIC => "BIC",
            Opcode::MVN => "MVN",
            Opcode::MUL => "MUL",
            Opcode::MLA => "MLA",
            Opcode::UMULL => "UMULL",
            Opcode::UMLAL => "UMLAL",
            Opcode::SMULL => "SMULL",
            Opcode::SMLAL => "SMLAL",
            Opcode::LDR(_, false, true) => "LDRT",
            Opcode::LDR(_, _, _) => "LDR",
            Opcode::STR(_, false, true) => "STRT",
            Opcode::STR(_, _, _) => "STR",
            Opcode::LDRB(_, false, true) => "LDRBT",
            Opcode::LDRB(_, _, _) => "LDRB",
            Opcode::STRB(_, false, true) => "STRBT",
            Opcode::STRB(_, _, _) => "STRB",
            Opcode::LDRH(_, _, _) => "LDRH",
            Opcode::STRH(_, _, _) => "STRH",
            Opcode::LDRSB(_, _, _) => "LDRSB",
            Opcode::LDRSH(_, _, _) => "LDRSH",
            Opcode::LDM(true, false, _, _) => "LDMIA",
            Opcode::LDM(true, true, _, _) => "LDMIB",
            Opcode::LDM(false, false, _, _) => "LDMDA",
            Opcode::LDM(false, true, _, _) => "LDMDB",
            Opcode::STM(true, false, _, _) => "STMIA",
            Opcode::STM(true, true, _, _) => "STMIB",
            Opcode::STM(false, false, _, _) => "STMDA",
            Opcode::STM(false, true, _, _) => "STMDB",
            Opcode::SWP => "SWP",
            Opcode::SWPB => "SWPB",
            Opcode::B => "B",
            Opcode::BL => "BL",
            Opcode::BX => "BX",
            Opcode::BLX => "BLX",
            Opcode::SWI => "SWI",
            Opcode::CLZ => "CLZ",
            Opcode::MRS => "MRS",
            Opcode::MSR => "MSR",
        }
    }

    /// single and halfword loads and stores, rendered as `Rt, <addressing mode>`.
    pub fn is_transfer(&self) -> bool {
        match self {
            Opcode::LDR(..) |
            Opcode::STR(..) |
            Opcode::LDRB(..) |
            Opcode::STRB(..) |
            Opcode::LDRH(..) |
            Opcode::STRH(..) |
            Opcode::LDRSB(..) |
            Opcode::LDRSH(..) => true,
            _ => false,
        }
    }

    /// `TST`, `TEQ`, `CMP` and `CMN` always set flags, so they never carry an `S`.
    pub fn is_comparison(&self) -> bool {
        match self {
            Opcode::TST |
            Opcode::TEQ |
            Opcode::CMP |
            Opcode::CMN => true,
            _ => false,
        }
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.name())
    }
}

static DATA_PROCESSING_OPCODES: [Opcode; 16] = [
    Opcode::AND,
    Opcode::EOR,
    Opcode::SUB,
    Opcode::RSB,
    Opcode::ADD,
    Opcode::ADC,
    Opcode::SBC,
    Opcode::RSC,
    Opcode::TST,
    Opcode::TEQ,
    Opcode::CMP,
    Opcode::CMN,
    Opcode::ORR,
    Opcode::MOV,
    Opcode::BIC,
    Opcode::MVN
];

/// the low twelve bits of a register-form shifter operand:
/// `| shift imm or Rs | shift type | reg-shift bit | Rm |`.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[repr(transparent)]
pub struct RegShift {
    data: u16
}

impl RegShift {
    pub fn into_shift(&self) -> RegShiftStyle {
        if self.data & 0b1_0000 == 0 {
            RegShiftStyle::RegImm(RegImmShift { data: self.data })
        } else {
            RegShiftStyle::RegReg(RegRegShift { data: self.data })
        }
    }

    pub fn from(data: u16) -> Self {
        RegShift { data: data & 0xfff }
    }

    /// a bare register, `LSL #0`.
    pub fn from_reg(reg: Reg) -> Self {
        RegShift { data: reg.number() as u16 & 0b1111 }
    }
}

pub enum RegShiftStyle {
    RegImm(RegImmShift),
    RegReg(RegRegShift),
}

#[repr(transparent)]
pub struct RegRegShift {
    data: u16
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ShiftStyle {
    LSL = 0,
    LSR = 1,
    ASR = 2,
    ROR = 3,
}

impl ShiftStyle {
    fn from(bits: u8) -> ShiftStyle {
        match bits & 0b11 {
            0b00 => ShiftStyle::LSL,
            0b01 => ShiftStyle::LSR,
            0b10 => ShiftStyle::ASR,
            _ => ShiftStyle::ROR,
        }
    }
}

impl Display for ShiftStyle {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        f.write_str(match self {
            ShiftStyle::LSL => "LSL",
            ShiftStyle::LSR => "LSR",
            ShiftStyle::ASR => "ASR",
            ShiftStyle::ROR => "ROR",
        })
    }
}

impl RegRegShift {
    pub fn shifter(&self) -> Reg {
        Reg::from_u8((self.data >> 8) as u8 & 0b1111)
    }
    pub fn stype(&self) -> ShiftStyle {
        ShiftStyle::from((self.data >> 5) as u8)
    }
    pub fn shiftee(&self) -> Reg {
        Reg::from_u8(self.data as u8 & 0b1111)
    }
}

#[repr(transparent)]
pub struct RegImmShift {
    data: u16
}

impl RegImmShift {
    /// the encoded amount. zero means different things per shift type; see `display`.
    pub fn imm(&self) -> u8 {
        (self.data >> 7) as u8 & 0b11111
    }
    pub fn stype(&self) -> ShiftStyle {
        ShiftStyle::from((self.data >> 5) as u8)
    }
    pub fn shiftee(&self) -> Reg {
        Reg::from_u8(self.data as u8 & 0b1111)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct Reg {
    bits: u8
}

impl Reg {
    pub const SP: Reg = Reg { bits: 13 };
    pub const LR: Reg = Reg { bits: 14 };
    pub const PC: Reg = Reg { bits: 15 };

    /// numbers past 15 are accepted and render as `r?`; decoded words never produce them.
    pub fn from_u8(bits: u8) -> Reg {
        Reg { bits }
    }

    pub fn number(&self) -> u8 {
        self.bits
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature="use-serde", derive(Serialize, Deserialize))]
pub enum StatusRegister {
    CPSR,
    SPSR,
}

impl Display for StatusRegister {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        f.write_str(match self {
            StatusRegister::CPSR => "CPSR",
            StatusRegister::SPSR => "SPSR",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg),
    RegList(u16),
    RegDeref(Reg),
    RegShift(RegShift),
    /// transfer offset magnitude; the sign lives in the opcode's `add` flag.
    Imm12(u16),
    /// a rotated immediate, already rotated.
    Imm32(u32),
    /// byte displacement from the pipelined pc (`address + 8`).
    BranchOffset(i32),
    SwiComment(u32),
    StatusReg(StatusRegister),
    Nothing,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub word: u32,
    pub condition: ConditionCode,
    pub opcode: Opcode,
    pub operands: [Operand; 4],
    pub s: bool
}

impl Instruction {
    /// the default dump for `word`.
    pub fn dump(word: u32) -> Instruction {
        Instruction {
            word,
            ..Instruction::default()
        }
    }

    pub fn s(&self) -> bool { self.s }
}

impl Default for Instruction {
    fn default() -> Self {
        Instruction {
            word: 0,
            condition: ConditionCode::AL,
            opcode: Opcode::DCD,
            operands: [Operand::Nothing, Operand::Nothing, Operand::Nothing, Operand::Nothing],
            s: false
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        display::format_instruction(self, &DisplayConfig::default(), 0, &mut NoSymbols, f)
    }
}

impl yaxpeax_arch::Instruction for Instruction {
    fn well_defined(&self) -> bool { self.opcode != Opcode::DCD }
}

impl LengthedInstruction for Instruction {
    type Unit = AddressDiff<<ARMv5 as Arch>::Address>;
    fn min_size() -> Self::Unit {
        AddressDiff::from_const(4)
    }
    fn len(&self) -> Self::Unit {
        AddressDiff::from_const(4)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature="use-serde", derive(Serialize, Deserialize))]
pub enum ConditionCode {
    EQ,
    NE,
    CS,
    CC,
    MI,
    PL,
    VS,
    VC,
    HI,
    LS,
    GE,
    LT,
    GT,
    LE,
    AL,
    NV,
}

impl ConditionCode {
    pub fn build(value: u8) -> ConditionCode {
        match value & 0b1111 {
            0b0000 => ConditionCode::EQ,
            0b0001 => ConditionCode::NE,
            0b0010 => ConditionCode::CS,
            0b0011 => ConditionCode::CC,
            0b0100 => ConditionCode::MI,
            0b0101 => ConditionCode::PL,
            0b0110 => ConditionCode::VS,
            0b0111 => ConditionCode::VC,
            0b1000 => ConditionCode::HI,
            0b1001 => ConditionCode::LS,
            0b1010 => ConditionCode::GE,
            0b1011 => ConditionCode::LT,
            0b1100 => ConditionCode::GT,
            0b1101 => ConditionCode::LE,
            0b1110 => ConditionCode::AL,
            _ => ConditionCode::NV,
        }
    }

    /// the mnemonic suffix. `AL` is implied and renders as nothing.
    pub fn name(&self) -> &'static str {
        match self {
            ConditionCode::EQ => "EQ",
            ConditionCode::NE => "NE",
            ConditionCode::CS => "CS",
            ConditionCode::CC => "CC",
            ConditionCode::MI => "MI",
            ConditionCode::PL => "PL",
            ConditionCode::VS => "VS",
            ConditionCode::VC => "VC",
            ConditionCode::HI => "HI",
            ConditionCode::LS => "LS",
            ConditionCode::GE => "GE",
            ConditionCode::LT => "LT",
            ConditionCode::GT => "GT",
            ConditionCode::LE => "LE",
            ConditionCode::AL => "",
            ConditionCode::NV => "NV",
        }
    }
}

impl Display for ConditionCode {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum DecodeError {
    ExhaustedInput,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f:  &mut fmt::Formatter) -> fmt::Result {
        use yaxpeax_arch::DecodeError;
        f.write_str(self.description())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {
    fn description(&self) -> &str {
        <Self as yaxpeax_arch::DecodeError>::description(self)
    }
}

impl From<ReadError> for DecodeError {
    fn from(_e: ReadError) -> DecodeError {
        DecodeError::ExhaustedInput
    }
}

// every word decodes to something, so running out of bytes is the only way to fail.
impl yaxpeax_arch::DecodeError for DecodeError {
    fn data_exhausted(&self) -> bool { self == &DecodeError::ExhaustedInput }
    fn bad_opcode(&self) -> bool { false }
    fn bad_operand(&self) -> bool { false }
    fn description(&self) -> &'static str {
        match self {
            DecodeError::ExhaustedInput => "exhausted input",
        }
    }
}

#[derive(Default, Debug)]
pub struct InstDecoder {}

impl Decoder<ARMv5> for InstDecoder {
    fn decode_into<T: Reader<<ARMv5 as Arch>::Address, <ARMv5 as Arch>::Word>>(&self, inst: &mut Instruction, words: &mut T) -> Result<(), <ARMv5 as Arch>::DecodeError> {
        let mut word_bytes = [0u8; 4];
        words.next_n(&mut word_bytes)?;
        *inst = decode_word(u32::from_le_bytes(word_bytes));
        Ok(())
    }
}

#[cfg(feature="use-serde")]
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct ARMv5 { }

#[cfg(not(feature="use-serde"))]
#[derive(Copy, Clone, Debug)]
pub struct ARMv5 { }

impl Arch for ARMv5 {
    type Word = u8;
    type Address = u32;
    type Instruction = Instruction;
    type DecodeError = DecodeError;
    type Decoder = InstDecoder;
    type Operand = Operand;
}
