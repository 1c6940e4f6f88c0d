//! An emulator core for the TMS9918A video display processor, the chip
//! behind the TI-99/4A, ColecoVision, MSX, and SG-1000.
//!
//! The [`vdp::Vdp`](vdp/struct.Vdp.html) type owns the chip's register
//! file, its 16 KiB of VRAM, and the address/register write latch, and
//! renders scanlines on demand through [`vdp::scanline`](vdp/fn.scanline.html).
//! It performs no I/O and knows nothing about CPU buses, vertical-blank
//! timing, or RGB palettes: the host drives it with port reads/writes and
//! scanline requests, and converts its indexed-color output to pixels
//! itself.

pub mod color;
pub mod memo;
pub mod vdp;

pub use crate::vdp::{Mode, Vdp};
