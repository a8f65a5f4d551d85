use core::fmt;

use crate::armv5::{
    ConditionCode, Decoration, DisplayConfig, Instruction, Opcode, Operand, Reg, RegShift,
    RegShiftStyle, ShiftStyle, SymbolEvent, SymbolKind, Symbolicator,
};

const MNEMONIC_FIELD_WIDTH: usize = 16;

/// the value of `pc` an instruction at `address` observes: two instructions ahead.
fn pipelined_pc(address: u32) -> u32 {
    address.wrapping_add(8)
}

/// write `<name><condition><suffix>` padded to the mnemonic field, always followed by at least
/// one space. extension decoders use this to line up with the core's output.
pub fn write_mnemonic<T: fmt::Write>(out: &mut T, name: &str, condition: ConditionCode, suffix: Option<&str>) -> fmt::Result {
    write_mnemonic_parts(out, name, false, condition, suffix.unwrap_or(""))
}

fn write_mnemonic_parts<T: fmt::Write>(out: &mut T, name: &str, s: bool, condition: ConditionCode, suffix: &str) -> fmt::Result {
    let s = if s { "S" } else { "" };
    let condition = condition.name();
    out.write_str(name)?;
    out.write_str(s)?;
    out.write_str(condition)?;
    out.write_str(suffix)?;
    let len = name.len() + s.len() + condition.len() + suffix.len();
    let pad = MNEMONIC_FIELD_WIDTH.saturating_sub(len).max(1);
    write!(out, "{:1$}", "", pad)
}

fn format_reg_list<T: fmt::Write>(f: &mut T, config: &DisplayConfig, list: u16) -> fmt::Result {
    f.write_str("{")?;
    let mut reg = 0u8;
    let mut tail = false;
    while reg < 16 {
        if list & (1 << reg) == 0 {
            reg += 1;
            continue;
        }
        let start = reg;
        while reg < 15 && list & (1 << (reg + 1)) != 0 {
            reg += 1;
        }
        if tail {
            f.write_str(", ")?;
        } else {
            tail = true;
        }
        f.write_str(config.register_name(Reg::from_u8(start)))?;
        if reg > start {
            write!(f, "-{}", config.register_name(Reg::from_u8(reg)))?;
        }
        reg += 1;
    }
    f.write_str("}")
}

fn format_shift<T: fmt::Write>(f: &mut T, config: &DisplayConfig, shift: RegShift) -> fmt::Result {
    match shift.into_shift() {
        RegShiftStyle::RegImm(imm_shift) => {
            f.write_str(config.register_name(imm_shift.shiftee()))?;
            match (imm_shift.stype(), imm_shift.imm()) {
                (ShiftStyle::LSL, 0) => Ok(()),
                (ShiftStyle::ROR, 0) => f.write_str(", RRX"),
                // a right shift by zero encodes a shift by 32
                (stype, 0) => write!(f, ", {} #32", stype),
                (stype, imm) => write!(f, ", {} #{}", stype, imm),
            }
        }
        RegShiftStyle::RegReg(reg_shift) => {
            write!(
                f, "{}, {} {}",
                config.register_name(reg_shift.shiftee()),
                reg_shift.stype(),
                config.register_name(reg_shift.shifter()),
            )
        },
    }
}

fn format_immediate<T: fmt::Write>(f: &mut T, config: &DisplayConfig, imm: u32) -> fmt::Result {
    write!(f, "#{}{:X}", config.hex_prefix(), imm)
}

fn format_address<T: fmt::Write>(f: &mut T, config: &DisplayConfig, address: u32) -> fmt::Result {
    write!(f, "{}{:08X}", config.hex_prefix(), address)
}

/// larger offsets from `sp` get their hex value as a trailing comment.
fn format_stack_comment<T: fmt::Write>(f: &mut T, config: &DisplayConfig, base: Reg, magnitude: u16) -> fmt::Result {
    if base == Reg::SP && magnitude > 9 {
        write!(f, "   @ {}{:X}", config.hex_prefix(), magnitude)
    } else {
        Ok(())
    }
}

fn format_operand<T: fmt::Write>(f: &mut T, config: &DisplayConfig, operand: &Operand) -> fmt::Result {
    match operand {
        Operand::Reg(reg) => f.write_str(config.register_name(*reg)),
        Operand::RegList(list) => format_reg_list(f, config, *list),
        Operand::RegDeref(reg) => write!(f, "[{}]", config.register_name(*reg)),
        Operand::RegShift(shift) => format_shift(f, config, *shift),
        Operand::Imm12(imm) => write!(f, "#{}", imm),
        Operand::Imm32(imm) => format_immediate(f, config, *imm),
        Operand::BranchOffset(offset) => write!(f, "#{}", offset),
        Operand::SwiComment(comment) => write!(f, "{}{:06X}", config.hex_prefix(), comment),
        Operand::StatusReg(psr) => write!(f, "{}", psr),
        Operand::Nothing => Ok(()),
    }
}

/// render `inst` as it would appear at `address`.
pub(crate) fn format_instruction<T: fmt::Write>(
    inst: &Instruction,
    config: &DisplayConfig,
    address: u32,
    symbols: &mut dyn Symbolicator,
    out: &mut T,
) -> fmt::Result {
    if inst.opcode == Opcode::DCD || (inst.opcode.is_transfer() && transfer_operands(inst).is_none()) {
        return write!(out, "DCD      {}{:08X}", config.hex_prefix(), inst.word);
    }

    write_mnemonic_parts(out, inst.opcode.name(), inst.s, inst.condition, "")?;

    match inst.opcode {
        Opcode::B |
        Opcode::BL => {
            if let Operand::BranchOffset(offset) = inst.operands[0] {
                let target = pipelined_pc(address).wrapping_add(offset as u32);
                let event = SymbolEvent { kind: SymbolKind::Branch, offset: 0, address: target, word: inst.word };
                return match symbols.symbolicate(&event) {
                    Decoration::Decorated(text) => out.write_str(&text),
                    Decoration::Undecorated => format_address(out, config, target),
                };
            }
        }
        Opcode::ADD |
        Opcode::SUB => {
            if let [Operand::Reg(rd), Operand::Reg(Reg::PC), Operand::Imm32(imm), _] = inst.operands {
                let (kind, target) = if inst.opcode == Opcode::ADD {
                    (SymbolKind::AddPcRelative, pipelined_pc(address).wrapping_add(imm))
                } else {
                    (SymbolKind::SubPcRelative, pipelined_pc(address).wrapping_sub(imm))
                };
                write!(out, "{}, {}, ", config.register_name(rd), config.register_name(Reg::PC))?;
                let event = SymbolEvent { kind, offset: imm as i32, address: target, word: inst.word };
                return match symbols.symbolicate(&event) {
                    Decoration::Decorated(text) => out.write_str(&text),
                    Decoration::Undecorated => format_immediate(out, config, imm),
                };
            }
        }
        Opcode::LDR(add, pre, wback) |
        Opcode::LDRB(add, pre, wback) |
        Opcode::LDRH(add, pre, wback) |
        Opcode::LDRSB(add, pre, wback) |
        Opcode::LDRSH(add, pre, wback) => {
            return format_transfer(out, config, inst, address, symbols, true, add, pre, wback);
        }
        Opcode::STR(add, pre, wback) |
        Opcode::STRB(add, pre, wback) |
        Opcode::STRH(add, pre, wback) => {
            return format_transfer(out, config, inst, address, symbols, false, add, pre, wback);
        }
        Opcode::LDM(_add, _pre, wback, usermode) |
        Opcode::STM(_add, _pre, wback, usermode) => {
            if let [Operand::Reg(rn), Operand::RegList(list), _, _] = inst.operands {
                write!(out, "{}{}, ", config.register_name(rn), if wback { "!" } else { "" })?;
                format_reg_list(out, config, list)?;
                return if usermode { out.write_str("^") } else { Ok(()) };
            }
        }
        _ => {}
    }

    let mut ops = inst.operands.iter().take_while(|op| **op != Operand::Nothing);
    if let Some(first) = ops.next() {
        format_operand(out, config, first)?;
    }
    for op in ops {
        out.write_str(", ")?;
        format_operand(out, config, op)?;
    }
    Ok(())
}

enum TransferOffset {
    Imm(u16),
    Reg(RegShift),
}

/// `Rt, Rn, offset` for a single or halfword transfer, or `None` if the operands were not built
/// that way.
fn transfer_operands(inst: &Instruction) -> Option<(Reg, Reg, TransferOffset)> {
    match inst.operands {
        [Operand::Reg(rt), Operand::Reg(rn), Operand::Imm12(imm), _] => Some((rt, rn, TransferOffset::Imm(imm))),
        [Operand::Reg(rt), Operand::Reg(rn), Operand::RegShift(shift), _] => Some((rt, rn, TransferOffset::Reg(shift))),
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn format_transfer<T: fmt::Write>(
    out: &mut T,
    config: &DisplayConfig,
    inst: &Instruction,
    address: u32,
    symbols: &mut dyn Symbolicator,
    load: bool,
    add: bool,
    pre: bool,
    wback: bool,
) -> fmt::Result {
    let (rt, rn, offset) = match transfer_operands(inst) {
        Some(operands) => operands,
        // `format_instruction` dumps these before the mnemonic is written.
        None => { return Err(fmt::Error); }
    };
    write!(out, "{}, ", config.register_name(rt))?;

    let magnitude = match offset {
        TransferOffset::Imm(imm) => imm,
        TransferOffset::Reg(shift) => {
            let sign = if add { "" } else { "-" };
            if pre {
                write!(out, "[{}, {}", config.register_name(rn), sign)?;
                format_shift(out, config, shift)?;
                out.write_str("]")?;
                if wback { out.write_str("!")?; }
                return Ok(());
            } else {
                write!(out, "[{}], {}", config.register_name(rn), sign)?;
                return format_shift(out, config, shift);
            }
        }
    };
    let offset = if add { magnitude as i32 } else { -(magnitude as i32) };

    if rn == Reg::PC {
        // literal pool access: the operand is an address, not an offset.
        let target = pipelined_pc(address).wrapping_add(offset as u32);
        let kind = if load { SymbolKind::LoadPcRelative } else { SymbolKind::StorePcRelative };
        let event = SymbolEvent { kind, offset, address: target, word: inst.word };
        return match symbols.symbolicate(&event) {
            Decoration::Decorated(text) => out.write_str(&text),
            Decoration::Undecorated => format_address(out, config, target),
        };
    }

    if magnitude == 0 && pre && !wback {
        return write!(out, "[{}]", config.register_name(rn));
    }

    if pre {
        write!(out, "[{}, #", config.register_name(rn))?;
    } else {
        write!(out, "[{}], #", config.register_name(rn))?;
    }

    let kind = if load { SymbolKind::Load } else { SymbolKind::Store };
    let event = SymbolEvent { kind, offset, address: 0, word: inst.word };
    let decorated = match symbols.symbolicate(&event) {
        Decoration::Decorated(text) => {
            out.write_str(&text)?;
            true
        }
        Decoration::Undecorated => {
            write!(out, "{}", offset)?;
            false
        }
    };
    if pre {
        out.write_str("]")?;
        if wback { out.write_str("!")?; }
    }
    if decorated {
        Ok(())
    } else {
        format_stack_comment(out, config, rn, magnitude)
    }
}

#[cfg(test)]
mod test {
    use alloc::string::String;
    use core::fmt::Write;

    use super::{format_reg_list, format_shift, write_mnemonic};
    use crate::armv5::{ConditionCode, DisplayConfig, RegShift};

    fn reg_list(list: u16) -> String {
        let mut text = String::new();
        format_reg_list(&mut text, &DisplayConfig::default(), list).unwrap();
        text
    }

    fn shift(data: u16) -> String {
        let mut text = String::new();
        format_shift(&mut text, &DisplayConfig::default(), RegShift::from(data)).unwrap();
        text
    }

    #[test]
    fn test_reg_list_ranges() {
        assert_eq!(reg_list(0b1_0010_0111), "{r0-r2, r5, r8}");
        assert_eq!(reg_list(0), "{}");
        assert_eq!(reg_list(0xffff), "{r0-pc}");
        assert_eq!(reg_list(0b1010_1010_1010_1010), "{r1, r3, r5, r7, r9, r11, sp, pc}");
        assert_eq!(reg_list(0x40f0), "{r4-r7, lr}");
        assert_eq!(reg_list(0xc000), "{lr-pc}");
        assert_eq!(reg_list(0x8001), "{r0, pc}");
    }

    #[test]
    fn test_shift_zero_amounts() {
        // |imm5|type|0|Rm|
        assert_eq!(shift(0x001), "r1");
        assert_eq!(shift(0x021), "r1, LSR #32");
        assert_eq!(shift(0x041), "r1, ASR #32");
        assert_eq!(shift(0x061), "r1, RRX");
        assert_eq!(shift(0x101), "r1, LSL #2");
        assert_eq!(shift(0xfe1), "r1, ROR #31");
        // |Rs|0|type|1|Rm|
        assert_eq!(shift(0x312), "r2, LSL r3");
        assert_eq!(shift(0xd72), "r2, ROR sp");
    }

    #[test]
    fn test_mnemonic_field() {
        let mut text = String::new();
        write_mnemonic(&mut text, "MOV", ConditionCode::AL, None).unwrap();
        assert_eq!(text.len(), 16);
        assert_eq!(text, "MOV             ");

        let mut text = String::new();
        write_mnemonic(&mut text, "FMULD", ConditionCode::NE, Some(".F64")).unwrap();
        assert_eq!(text, "FMULDNE.F64     ");

        let mut text = String::new();
        write_mnemonic(&mut text, "VERYLONGMNEMONIC", ConditionCode::EQ, None).unwrap();
        assert_eq!(text, "VERYLONGMNEMONICEQ ");

        let mut text = String::new();
        write!(text, "|").unwrap();
        write_mnemonic(&mut text, "FIFTEENCHARSXYZ", ConditionCode::AL, None).unwrap();
        assert_eq!(text, "|FIFTEENCHARSXYZ ");
    }
}
