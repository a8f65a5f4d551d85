use alloc::string::String;
use core::fmt;

use crate::armv5::{DisplayConfig, Symbolicator};

/// a decoder for encodings outside the core integer set, such as a floating point coprocessor.
///
/// extensions are only offered words that no core family claimed. `decode` writes the whole line
/// into `out` (starting with `write_mnemonic`, to line up with everything else) and returns
/// whether it recognized the word. anything written before returning `false` is discarded.
pub trait ExtensionDecoder {
    fn decode(
        &self,
        word: u32,
        address: u32,
        config: &DisplayConfig,
        symbols: &mut dyn Symbolicator,
        out: &mut String,
    ) -> Result<bool, fmt::Error>;
}
