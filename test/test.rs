
use yaxpeax_arch::{Arch, Decoder, DecodeError as _, U8Reader};
use arm_disass::armv5::{ARMv5, DecodeError, Disassembler, NoSymbols};

// a full sweep of the word space takes a while; a prime stride still visits every family and every
// condition.
const STRIDE: usize = 65_521;

#[test]
fn test_armv5_does_not_panic() {
    let armv5 = <ARMv5 as Arch>::Decoder::default();

    for i in (0..=u32::MAX).step_by(STRIDE) {
        let bytes = i.to_le_bytes();
        let res = armv5.decode(&mut U8Reader::new(&bytes));
        if let Ok(instr) = res {
            let s = instr.to_string();
            drop(s);
        }
    }
}

#[test]
fn test_disassembler_does_not_panic() {
    let disassembler = Disassembler::new();

    for i in (0..=u32::MAX).step_by(STRIDE) {
        let s = disassembler.disassemble_to_string(i, i as u64, &mut NoSymbols);
        drop(s);
    }
    // every low half under an always-executed condition, across the major opcode groups
    for high in 0xe0u32..=0xefu32 {
        for low in (0..=0xffffu32).step_by(7) {
            let word = (high << 24) | ((low & 0xff00) << 8) | (low & 0xff);
            let s = disassembler.disassemble_to_string(word, 0x8000, &mut NoSymbols);
            assert!(s.len() > 16, "{:08x} rendered as {:?}", word, s);
        }
    }
}

#[test]
fn test_decoder_reads_little_endian() {
    let armv5 = <ARMv5 as Arch>::Decoder::default();
    let bytes = [0x05, 0x10, 0xa0, 0xe3, 0x1e, 0xff, 0x2f, 0xe1];
    let mut reader = U8Reader::new(&bytes);
    let first = armv5.decode(&mut reader).unwrap();
    let second = armv5.decode(&mut reader).unwrap();
    assert_eq!(first.word, 0xe3a0_1005);
    assert_eq!(second.word, 0xe12f_ff1e);
    assert_eq!(first.to_string(), "MOV             r1, #0x5");
    assert_eq!(armv5.decode(&mut reader), Err(DecodeError::ExhaustedInput));
}

#[test]
fn test_decoder_exhausted_input() {
    let armv5 = <ARMv5 as Arch>::Decoder::default();
    let err = armv5.decode(&mut U8Reader::new(&[0x05, 0x10, 0xa0])).unwrap_err();
    assert_eq!(err, DecodeError::ExhaustedInput);
    assert!(err.data_exhausted());
    assert!(!err.bad_opcode());
    assert_eq!(err.to_string(), "exhausted input");
}

#[test]
fn test_dumps_are_not_well_defined() {
    use yaxpeax_arch::Instruction as _;

    let armv5 = <ARMv5 as Arch>::Decoder::default();
    let dump = armv5.decode(&mut U8Reader::new(&[0x00, 0x00, 0x00, 0xfa])).unwrap();
    assert!(!dump.well_defined());
    let mov = armv5.decode(&mut U8Reader::new(&[0x05, 0x10, 0xa0, 0xe3])).unwrap();
    assert!(mov.well_defined());
}
