use crate::armv5::{
    ConditionCode, DATA_PROCESSING_OPCODES, Instruction, Opcode, Operand, Reg, RegShift,
    StatusRegister,
};

pub(crate) enum Dispatch {
    Decoded(Instruction),
    /// a family claimed the word but found it undefined. this is final: nothing else gets a look.
    Refused,
    /// no family matched.
    Unclaimed,
}

struct Family {
    name: &'static str,
    mask: u32,
    pattern: u32,
    decode: fn(u32) -> Option<Instruction>,
}

/*
 * families in priority order, first match wins. several patterns are subsets of later, broader
 * ones: every multiply, swap and halfword transfer also fits the data-processing pattern, CLZ and
 * the status register moves sit inside it too, and the BLX immediate form fits the branch
 * pattern. reordering this table means re-checking every one of those overlaps.
 */
static FAMILIES: [Family; 15] = [
    // |1 1 1 1|1 0 1|H|x x x x x x x x x x x x x x x x x x x x x x x x|
    // left as a dump rather than shown as a `BLNV`.
    Family { name: "blx (immediate)", mask: 0xfe00_0000, pattern: 0xfa00_0000, decode: leave_as_dump },
    Family { name: "bx", mask: 0x0fff_fff0, pattern: 0x012f_ff10, decode: decode_bx_blx },
    Family { name: "blx (register)", mask: 0x0fff_fff0, pattern: 0x012f_ff30, decode: decode_bx_blx },
    Family { name: "swp", mask: 0x0fb0_0ff0, pattern: 0x0100_0090, decode: decode_swp },
    Family { name: "clz", mask: 0x0fff_0ff0, pattern: 0x016f_0f10, decode: decode_clz },
    Family { name: "mrs", mask: 0x0fbf_0fff, pattern: 0x010f_0000, decode: decode_mrs },
    Family { name: "msr", mask: 0x0db0_f000, pattern: 0x0120_f000, decode: decode_msr },
    // the accumulate bit (21) is outside the mask, so this covers both MUL and MLA.
    Family { name: "mul", mask: 0x0fc0_00f0, pattern: 0x0000_0090, decode: decode_multiply },
    Family { name: "long multiply", mask: 0x0f80_00f0, pattern: 0x0080_0090, decode: decode_long_multiply },
    // |c o n d|0 0 0|x x x x x|x x x x|x x x x|x x x x|1|s h|1|x x x x|
    Family { name: "halfword transfer", mask: 0x0e00_0090, pattern: 0x0000_0090, decode: decode_halfword_transfer },
    Family { name: "branch", mask: 0x0e00_0000, pattern: 0x0a00_0000, decode: decode_branch },
    Family { name: "swi", mask: 0x0f00_0000, pattern: 0x0f00_0000, decode: decode_swi },
    Family { name: "single data transfer", mask: 0x0c00_0000, pattern: 0x0400_0000, decode: decode_single_transfer },
    Family { name: "block data transfer", mask: 0x0e00_0000, pattern: 0x0800_0000, decode: decode_block_transfer },
    Family { name: "data processing", mask: 0x0c00_0000, pattern: 0x0000_0000, decode: decode_data_processing },
];

pub(crate) fn dispatch(word: u32) -> Dispatch {
    for family in FAMILIES.iter() {
        if word & family.mask == family.pattern {
            return match (family.decode)(word) {
                Some(inst) => Dispatch::Decoded(inst),
                None => {
                    trace!("{:#010x}: {} refused the word", word, family.name);
                    Dispatch::Refused
                }
            };
        }
    }
    Dispatch::Unclaimed
}

/// decode one instruction word. this never fails: words no family recognizes come back as
/// `Opcode::DCD`.
pub fn decode_word(word: u32) -> Instruction {
    match dispatch(word) {
        Dispatch::Decoded(inst) => inst,
        Dispatch::Refused |
        Dispatch::Unclaimed => Instruction::dump(word),
    }
}

/// an 8-bit value rotated right by twice the 4-bit rotate field, from the low twelve bits.
pub(crate) fn rotated_immediate(word: u32) -> u32 {
    let imm8 = word & 0xff;
    let rot = ((word >> 8) & 0x0f) * 2;
    imm8.rotate_right(rot)
}

fn reg(word: u32, lo: u32) -> Reg {
    Reg::from_u8(((word >> lo) & 0x0f) as u8)
}

fn bit(word: u32, bit: u32) -> bool {
    (word >> bit) & 1 == 1
}

fn instruction(word: u32, opcode: Opcode, operands: [Operand; 4], s: bool) -> Instruction {
    Instruction {
        word,
        condition: ConditionCode::build((word >> 28) as u8),
        opcode,
        operands,
        s,
    }
}

fn leave_as_dump(_word: u32) -> Option<Instruction> {
    None
}

fn decode_bx_blx(word: u32) -> Option<Instruction> {
    let opcode = if bit(word, 5) { Opcode::BLX } else { Opcode::BX };
    Some(instruction(word, opcode, [
        Operand::Reg(reg(word, 0)),
        Operand::Nothing,
        Operand::Nothing,
        Operand::Nothing,
    ], false))
}

#[allow(non_snake_case)]
fn decode_swp(word: u32) -> Option<Instruction> {
    let opcode = if bit(word, 22) { Opcode::SWPB } else { Opcode::SWP };
    let (Rn, Rd, Rm) = (reg(word, 16), reg(word, 12), reg(word, 0));
    Some(instruction(word, opcode, [
        Operand::Reg(Rd),
        Operand::Reg(Rm),
        Operand::RegDeref(Rn),
        Operand::Nothing,
    ], false))
}

fn decode_clz(word: u32) -> Option<Instruction> {
    Some(instruction(word, Opcode::CLZ, [
        Operand::Reg(reg(word, 12)),
        Operand::Reg(reg(word, 0)),
        Operand::Nothing,
        Operand::Nothing,
    ], false))
}

fn status_register(word: u32) -> StatusRegister {
    if bit(word, 22) { StatusRegister::SPSR } else { StatusRegister::CPSR }
}

fn decode_mrs(word: u32) -> Option<Instruction> {
    Some(instruction(word, Opcode::MRS, [
        Operand::Reg(reg(word, 12)),
        Operand::StatusReg(status_register(word)),
        Operand::Nothing,
        Operand::Nothing,
    ], false))
}

fn decode_msr(word: u32) -> Option<Instruction> {
    let source = if bit(word, 25) {
        Operand::Imm32(rotated_immediate(word))
    } else {
        Operand::Reg(reg(word, 0))
    };
    Some(instruction(word, Opcode::MSR, [
        Operand::StatusReg(status_register(word)),
        source,
        Operand::Nothing,
        Operand::Nothing,
    ], false))
}

// |c o n d|0 0 0 0 0 0|A|S|  Rd   |  Rn   |  Rs   |1 0 0 1|  Rm   |
#[allow(non_snake_case)]
fn decode_multiply(word: u32) -> Option<Instruction> {
    let (Rd, Rn, Rs, Rm) = (reg(word, 16), reg(word, 12), reg(word, 8), reg(word, 0));
    let inst = if bit(word, 21) {
        instruction(word, Opcode::MLA, [
            Operand::Reg(Rd),
            Operand::Reg(Rm),
            Operand::Reg(Rs),
            Operand::Reg(Rn),
        ], bit(word, 20))
    } else {
        instruction(word, Opcode::MUL, [
            Operand::Reg(Rd),
            Operand::Reg(Rm),
            Operand::Reg(Rs),
            Operand::Nothing,
        ], bit(word, 20))
    };
    Some(inst)
}

// |c o n d|0 0 0 0 1|U|A|S| RdHi  | RdLo  |  Rs   |1 0 0 1|  Rm   |
#[allow(non_snake_case)]
fn decode_long_multiply(word: u32) -> Option<Instruction> {
    let opcode = match (bit(word, 22), bit(word, 21)) {
        (false, false) => Opcode::UMULL,
        (false, true) => Opcode::UMLAL,
        (true, false) => Opcode::SMULL,
        (true, true) => Opcode::SMLAL,
    };
    let (RdHi, RdLo, Rs, Rm) = (reg(word, 16), reg(word, 12), reg(word, 8), reg(word, 0));
    Some(instruction(word, opcode, [
        Operand::Reg(RdLo),
        Operand::Reg(RdHi),
        Operand::Reg(Rm),
        Operand::Reg(Rs),
    ], bit(word, 20)))
}

// |c o n d|0 0 0|P|U|I|W|L|  Rn   |  Rd   | hi/0  |1|s h|1| lo/Rm |
#[allow(non_snake_case)]
fn decode_halfword_transfer(word: u32) -> Option<Instruction> {
    let (pre, add, wback) = (bit(word, 24), bit(word, 23), bit(word, 21));
    let opcode = match (bit(word, 20), (word >> 5) & 0b11) {
        (false, 0b01) => Opcode::STRH(add, pre, wback),
        (true, 0b01) => Opcode::LDRH(add, pre, wback),
        (true, 0b10) => Opcode::LDRSB(add, pre, wback),
        (true, 0b11) => Opcode::LDRSH(add, pre, wback),
        // `sh == 0` is the multiply and swap space, and stores have no signed forms.
        _ => { return None; }
    };
    let (Rn, Rd) = (reg(word, 16), reg(word, 12));
    let offset = if bit(word, 22) {
        Operand::Imm12((((word >> 4) & 0xf0) | (word & 0x0f)) as u16)
    } else {
        Operand::RegShift(RegShift::from_reg(reg(word, 0)))
    };
    Some(instruction(word, opcode, [
        Operand::Reg(Rd),
        Operand::Reg(Rn),
        offset,
        Operand::Nothing,
    ], false))
}

fn decode_branch(word: u32) -> Option<Instruction> {
    let opcode = if bit(word, 24) { Opcode::BL } else { Opcode::B };
    // sign-extend the 24-bit word offset and scale it to bytes in one go.
    let offset = (((word & 0x00ff_ffff) << 8) as i32) >> 6;
    Some(instruction(word, opcode, [
        Operand::BranchOffset(offset),
        Operand::Nothing,
        Operand::Nothing,
        Operand::Nothing,
    ], false))
}

fn decode_swi(word: u32) -> Option<Instruction> {
    Some(instruction(word, Opcode::SWI, [
        Operand::SwiComment(word & 0x00ff_ffff),
        Operand::Nothing,
        Operand::Nothing,
        Operand::Nothing,
    ], false))
}

// |c o n d|0 1|I|P|U|B|W|L|  Rn   |  Rd   |        offset         |
#[allow(non_snake_case)]
fn decode_single_transfer(word: u32) -> Option<Instruction> {
    let register_offset = bit(word, 25);
    if register_offset && bit(word, 4) {
        // |c o n d|0 1 1|x x x x x x x x x x x x x x x x x x x x|1|x x x x|
        // architecturally undefined.
        return None;
    }
    let (pre, add, wback) = (bit(word, 24), bit(word, 23), bit(word, 21));
    let opcode = match (bit(word, 20), bit(word, 22)) {
        (false, false) => Opcode::STR(add, pre, wback),
        (true, false) => Opcode::LDR(add, pre, wback),
        (false, true) => Opcode::STRB(add, pre, wback),
        (true, true) => Opcode::LDRB(add, pre, wback),
    };
    let (Rn, Rd) = (reg(word, 16), reg(word, 12));
    let offset = if register_offset {
        Operand::RegShift(RegShift::from((word & 0xfff) as u16))
    } else {
        Operand::Imm12((word & 0xfff) as u16)
    };
    Some(instruction(word, opcode, [
        Operand::Reg(Rd),
        Operand::Reg(Rn),
        offset,
        Operand::Nothing,
    ], false))
}

// |c o n d|1 0 0|P|U|S|W|L|  Rn   |         register list         |
fn decode_block_transfer(word: u32) -> Option<Instruction> {
    let (pre, add, usermode, wback) = (bit(word, 24), bit(word, 23), bit(word, 22), bit(word, 21));
    let opcode = if bit(word, 20) {
        Opcode::LDM(add, pre, wback, usermode)
    } else {
        Opcode::STM(add, pre, wback, usermode)
    };
    Some(instruction(word, opcode, [
        Operand::Reg(reg(word, 16)),
        Operand::RegList((word & 0xffff) as u16),
        Operand::Nothing,
        Operand::Nothing,
    ], false))
}

// |c o n d|0 0|I| opcode|S|  Rn   |  Rd   |       operand 2       |
#[allow(non_snake_case)]
fn decode_data_processing(word: u32) -> Option<Instruction> {
    let opcode = DATA_PROCESSING_OPCODES[((word >> 21) & 0x0f) as usize];
    let (Rn, Rd) = (reg(word, 16), reg(word, 12));
    let operand2 = if bit(word, 25) {
        Operand::Imm32(rotated_immediate(word))
    } else {
        Operand::RegShift(RegShift::from((word & 0xfff) as u16))
    };
    let operands = match opcode {
        Opcode::TST |
        Opcode::TEQ |
        Opcode::CMP |
        Opcode::CMN => [Operand::Reg(Rn), operand2, Operand::Nothing, Operand::Nothing],
        Opcode::MOV |
        Opcode::MVN => [Operand::Reg(Rd), operand2, Operand::Nothing, Operand::Nothing],
        _ => [Operand::Reg(Rd), Operand::Reg(Rn), operand2, Operand::Nothing],
    };
    let s = bit(word, 20) && !opcode.is_comparison();
    Some(instruction(word, opcode, operands, s))
}

#[cfg(test)]
mod test {
    use super::{decode_word, rotated_immediate};
    use crate::armv5::{ConditionCode, Opcode, Operand, Reg};

    #[test]
    fn test_rotated_immediate() {
        assert_eq!(rotated_immediate(0x005), 0x5);
        assert_eq!(rotated_immediate(0x4ff), 0xff00_0000);
        assert_eq!(rotated_immediate(0xf01), 0x4);
        assert_eq!(rotated_immediate(0x102), 0x8000_0000);
        assert_eq!(rotated_immediate(0x1ff), 0xc000_003f);
    }

    #[test]
    fn test_branch_offset_sign_extension() {
        assert_eq!(decode_word(0xea00_0000).operands[0], Operand::BranchOffset(0));
        assert_eq!(decode_word(0xeaff_fffe).operands[0], Operand::BranchOffset(-8));
        assert_eq!(decode_word(0xea7f_ffff).operands[0], Operand::BranchOffset(0x01ff_fffc));
        assert_eq!(decode_word(0xea80_0000).operands[0], Operand::BranchOffset(-0x0200_0000));
    }

    #[test]
    fn test_decode_structure() {
        let inst = decode_word(0xe033_4291);
        assert_eq!(inst.opcode, Opcode::MLA);
        assert!(inst.s());
        assert_eq!(inst.operands, [
            Operand::Reg(Reg::from_u8(3)),
            Operand::Reg(Reg::from_u8(1)),
            Operand::Reg(Reg::from_u8(2)),
            Operand::Reg(Reg::from_u8(4)),
        ]);

        let inst = decode_word(0x1350_0001);
        assert_eq!(inst.opcode, Opcode::CMP);
        assert_eq!(inst.condition, ConditionCode::NE);
        assert!(!inst.s());

        assert_eq!(decode_word(0xe4b1_0004).opcode, Opcode::LDR(true, false, true));
        assert_eq!(decode_word(0xe8fd_8010).opcode, Opcode::LDM(true, false, true, true));
    }

    #[test]
    fn test_refusals_are_dumps() {
        // BLX (immediate)
        assert_eq!(decode_word(0xfa00_0000).opcode, Opcode::DCD);
        // signed halfword store
        assert_eq!(decode_word(0xe1c1_00d0).opcode, Opcode::DCD);
        // register-offset transfer with bit 4 set
        assert_eq!(decode_word(0xe791_0012).opcode, Opcode::DCD);
        // coprocessor register transfer: nothing claims it
        assert_eq!(decode_word(0xee00_0f10).opcode, Opcode::DCD);
        assert_eq!(decode_word(0xee00_0f10).word, 0xee00_0f10);
    }
}
