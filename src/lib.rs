#![no_std]

#[cfg(feature="use-serde")]
#[macro_use] extern crate serde_derive;
#[cfg(feature="use-serde")]
extern crate serde;
#[cfg(feature="std")]
extern crate std;
extern crate alloc;
extern crate yaxpeax_arch;
#[macro_use] extern crate log;

pub mod armv5;
pub mod sink;
