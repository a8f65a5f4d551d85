use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use yaxpeax_arch::{Decoder, U8Reader};

use crate::armv5::decode::{self, Dispatch};
use crate::armv5::display;
use crate::armv5::{DisplayConfig, ExtensionDecoder, InstDecoder, Instruction, Symbolicator};
use crate::sink::BoundedBuffer;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum DisassemblyError {
    /// the rendered line does not fit the caller's buffer.
    CapacityExceeded { capacity: usize },
}

impl fmt::Display for DisassemblyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DisassemblyError::CapacityExceeded { capacity } => {
                write!(f, "disassembly exceeds output capacity of {} bytes", capacity)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DisassemblyError {}

/// the word-to-text entry point: a display configuration plus any extension decoders, set up
/// once and then used for as many words as needed.
#[derive(Default)]
pub struct Disassembler {
    config: DisplayConfig,
    extensions: Vec<Box<dyn ExtensionDecoder>>,
}

impl fmt::Debug for Disassembler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Disassembler")
            .field("config", &self.config)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

impl Disassembler {
    pub fn new() -> Self {
        Disassembler::default()
    }

    pub fn with_config(config: DisplayConfig) -> Self {
        Disassembler { config, extensions: Vec::new() }
    }

    /// extensions are tried in the order they were added.
    pub fn with_extension(mut self, extension: Box<dyn ExtensionDecoder>) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DisplayConfig {
        &mut self.config
    }

    /// render `word`, located at `address`, into `out`. only the low 32 bits of `address` are
    /// used.
    ///
    /// decoding itself cannot fail; an error here comes from `out`.
    pub fn disassemble<T: fmt::Write>(&self, word: u32, address: u64, symbols: &mut dyn Symbolicator, out: &mut T) -> fmt::Result {
        let address = address as u32;
        let inst = match decode::dispatch(word) {
            Dispatch::Decoded(inst) => inst,
            Dispatch::Refused => Instruction::dump(word),
            Dispatch::Unclaimed => {
                if let Some(line) = self.try_extensions(word, address, symbols) {
                    return out.write_str(&line);
                }
                trace!("{:#010x}: unclaimed, leaving it as a dump", word);
                Instruction::dump(word)
            }
        };
        display::format_instruction(&inst, &self.config, address, symbols, out)
    }

    fn try_extensions(&self, word: u32, address: u32, symbols: &mut dyn Symbolicator) -> Option<String> {
        let mut scratch = String::new();
        for (idx, extension) in self.extensions.iter().enumerate() {
            scratch.clear();
            match extension.decode(word, address, &self.config, symbols, &mut scratch) {
                Ok(true) => {
                    debug!("{:#010x}: claimed by extension decoder {}", word, idx);
                    return Some(scratch);
                }
                Ok(false) => {}
                Err(fmt::Error) => {
                    debug!("{:#010x}: extension decoder {} failed, treating it as a refusal", word, idx);
                }
            }
        }
        None
    }

    pub fn disassemble_to_string(&self, word: u32, address: u64, symbols: &mut dyn Symbolicator) -> String {
        let mut text = String::new();
        match self.disassemble(word, address, symbols, &mut text) {
            Ok(()) => text,
            Err(fmt::Error) => unreachable!("writing to a String does not fail"),
        }
    }

    /// render into caller-owned storage, reporting rather than truncating a line that does not
    /// fit.
    pub fn disassemble_into<'b>(&self, word: u32, address: u64, symbols: &mut dyn Symbolicator, buf: &'b mut [u8]) -> Result<&'b str, DisassemblyError> {
        let mut sink = BoundedBuffer::new(buf);
        match self.disassemble(word, address, symbols, &mut sink) {
            Ok(()) => Ok(sink.into_str()),
            Err(fmt::Error) => Err(DisassemblyError::CapacityExceeded { capacity: sink.capacity() }),
        }
    }

    /// walk a little-endian code area starting at `base`, one line per word. bytes left over
    /// after the last whole word are not shown.
    pub fn listing<'a>(&'a self, bytes: &'a [u8], base: u32, symbols: &'a mut dyn Symbolicator) -> Listing<'a> {
        Listing {
            disassembler: self,
            reader: U8Reader::new(bytes),
            decoder: InstDecoder::default(),
            remaining: bytes.len(),
            address: base,
            symbols,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingLine {
    pub address: u32,
    pub word: u32,
    pub text: String,
}

impl fmt::Display for ListingLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:08X}  {:08X}  {}", self.address, self.word, self.text)
    }
}

pub struct Listing<'a> {
    disassembler: &'a Disassembler,
    reader: U8Reader<'a>,
    decoder: InstDecoder,
    remaining: usize,
    address: u32,
    symbols: &'a mut dyn Symbolicator,
}

impl<'a> Iterator for Listing<'a> {
    type Item = ListingLine;

    fn next(&mut self) -> Option<ListingLine> {
        if self.remaining < 4 {
            if self.remaining > 0 {
                debug!("{:#010x}: {} trailing bytes left out of the listing", self.address, self.remaining);
                self.remaining = 0;
            }
            return None;
        }
        let inst = self.decoder.decode(&mut self.reader).ok()?;
        self.remaining -= 4;
        let address = self.address;
        self.address = self.address.wrapping_add(4);
        let text = self.disassembler.disassemble_to_string(inst.word, address as u64, &mut *self.symbols);
        Some(ListingLine { address, word: inst.word, text })
    }
}
