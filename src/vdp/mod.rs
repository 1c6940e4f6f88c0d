//! The TMS9918A core: registers, VRAM, the address/register write latch, and
//! the status register.
//!
//! Rendering (the sprite engine, the four mode renderers, and the public
//! scanline dispatcher) lives in the sibling `sprites`, `modes`, and
//! `scanline` submodules, which reach into this module's private state
//! directly since they're all part of the same component.

mod modes;
mod scanline;
mod sprites;

pub use self::scanline::scanline;

use std::fmt;

use bitflags::bitflags;

use crate::memo::{Inbox, NothingInbox};

/// Size of the chip's attached video memory.
pub const VRAM_SIZE: usize = 0x4000;

/// Visible raster width in pixels.
pub const SCREEN_WIDTH: usize = 256;

/// Visible raster height in scanlines.
pub const SCREEN_HEIGHT: usize = 192;

const LAST_SPRITE_VPOS: u8 = 0xD0;
const MAX_SPRITES: u8 = 32;
const MAX_SCANLINE_SPRITES: u32 = 4;

bitflags! {
    /// The three single-bit flags packed into the top of the status
    /// register. The low 5 bits of the register are a sprite index, not a
    /// flag, and so aren't modeled here.
    pub struct StatusFlags: u8 {
        const INTERRUPT = 0b1000_0000;
        const FIFTH_SPRITE = 0b0100_0000;
        const COLLISION = 0b0010_0000;
    }
}

/// The four display modes the chip can be configured into.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Mode {
    GraphicsI,
    GraphicsII,
    Multicolor,
    Text,
}

impl Default for Mode {
    #[inline]
    fn default() -> Self {
        Mode::GraphicsI
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Latch {
    Low,
    High,
}

impl Default for Latch {
    #[inline]
    fn default() -> Self {
        Latch::Low
    }
}

/// Events the VDP reports as it runs, for debugging and tracing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Memo {
    WriteAddress(u8),
    WriteData(u8),
    RegisterWrite { register: u8, value: u8 },
    ModeChanged(Mode),
    ReadData(u8),
    ReadStatus(u8),
    FrameInterrupt,
    FifthSprite { index: u8 },
    SpriteCollision,
}

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Memo::WriteAddress(x) => write!(f, "write address byte {:#04x}", x),
            Memo::WriteData(x) => write!(f, "write data {:#04x}", x),
            Memo::RegisterWrite { register, value } => {
                write!(f, "register {} <- {:#04x}", register, value)
            }
            Memo::ModeChanged(mode) => write!(f, "mode changed to {:?}", mode),
            Memo::ReadData(x) => write!(f, "read data {:#04x}", x),
            Memo::ReadStatus(x) => write!(f, "read status {:#04x}", x),
            Memo::FrameInterrupt => write!(f, "frame interrupt"),
            Memo::FifthSprite { index } => write!(f, "fifth sprite at slot {}", index),
            Memo::SpriteCollision => write!(f, "sprite collision"),
        }
    }
}

/// The state of a single TMS9918A: its registers, its 16 KiB of VRAM, and
/// the address/register write latch.
///
/// `Ibx` is an [`Inbox`](../memo/trait.Inbox.html) that receives a `Memo` for
/// every notable event; it defaults to `NothingInbox`, which costs nothing
/// when nobody is listening.
pub struct Vdp<Ibx = NothingInbox<Memo>> {
    vram: [u8; VRAM_SIZE],
    registers: [u8; 8],
    status: u8,
    address: u16,
    latch: Latch,
    mode: Mode,
    pub inbox: Ibx,
}

impl Vdp<NothingInbox<Memo>> {
    /// A freshly reset VDP that discards its memos.
    pub fn new() -> Self {
        Vdp::with_inbox(NothingInbox::default())
    }
}

impl Default for Vdp<NothingInbox<Memo>> {
    fn default() -> Self {
        Vdp::new()
    }
}

impl<Ibx> Vdp<Ibx> {
    /// A freshly reset VDP reporting its memos to `inbox`.
    pub fn with_inbox(inbox: Ibx) -> Self {
        Vdp {
            vram: [0xFF; VRAM_SIZE],
            registers: [0; 8],
            status: 0,
            address: 0,
            latch: Latch::Low,
            mode: Mode::GraphicsI,
            inbox,
        }
    }

    /// Restores VRAM, registers, status, address pointer, latch phase, and
    /// mode to their power-on values. Does not replace the inbox.
    pub fn reset(&mut self) {
        self.vram = [0xFF; VRAM_SIZE];
        self.registers = [0; 8];
        self.status = 0;
        self.address = 0;
        self.latch = Latch::Low;
        self.mode = Mode::GraphicsI;
    }

    /// The display mode derived from R0 and R1 as of the last register
    /// write.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Register `i & 0x7`.
    #[inline]
    pub fn register(&self, i: u8) -> u8 {
        self.registers[(i & 0x7) as usize]
    }

    /// `true` when R1 bit 6 (BLANK) enables the display.
    #[inline]
    pub fn display_enabled(&self) -> bool {
        self.register(1) & 0x40 != 0
    }

    #[inline]
    fn sprite_size_px(&self) -> u16 {
        if self.register(1) & 0x02 != 0 {
            16
        } else {
            8
        }
    }

    #[inline]
    fn sprite_magnified(&self) -> bool {
        self.register(1) & 0x01 != 0
    }

    #[inline]
    fn name_table_addr(&self) -> u16 {
        (u16::from(self.register(2)) & 0x0F) << 10
    }

    #[inline]
    fn color_table_addr(&self) -> u16 {
        if self.mode == Mode::GraphicsII {
            (u16::from(self.register(3)) & 0x80) << 6
        } else {
            u16::from(self.register(3)) << 6
        }
    }

    #[inline]
    fn pattern_table_addr(&self) -> u16 {
        if self.mode == Mode::GraphicsII {
            (u16::from(self.register(4)) & 0x04) << 11
        } else {
            (u16::from(self.register(4)) & 0x07) << 11
        }
    }

    #[inline]
    fn sprite_attr_table_addr(&self) -> u16 {
        (u16::from(self.register(5)) & 0x7F) << 7
    }

    #[inline]
    fn sprite_pattern_table_addr(&self) -> u16 {
        (u16::from(self.register(6)) & 0x07) << 11
    }

    /// Backdrop color: R7 low nibble while the display is enabled, black
    /// while it is disabled.
    #[inline]
    fn main_bg_color(&self) -> u8 {
        if self.display_enabled() {
            self.register(7) & 0x0F
        } else {
            crate::color::BLACK
        }
    }

    #[inline]
    fn main_fg_color(&self) -> u8 {
        let c = self.register(7) >> 4;
        if c == crate::color::TRANSPARENT {
            self.main_bg_color()
        } else {
            c
        }
    }

    #[inline]
    fn fg_color(&self, color_byte: u8) -> u8 {
        let c = color_byte >> 4;
        if c == crate::color::TRANSPARENT {
            self.main_bg_color()
        } else {
            c
        }
    }

    #[inline]
    fn bg_color(&self, color_byte: u8) -> u8 {
        let c = color_byte & 0x0F;
        if c == crate::color::TRANSPARENT {
            self.main_bg_color()
        } else {
            c
        }
    }

    #[inline]
    fn mode_from_registers(&self) -> Mode {
        if self.registers[0] & 0x02 != 0 {
            return Mode::GraphicsII;
        }
        match (self.registers[1] & 0x18) >> 3 {
            0 => Mode::GraphicsI,
            1 => Mode::Multicolor,
            2 => Mode::Text,
            _ => Mode::GraphicsI,
        }
    }

    /// Read a byte directly out of VRAM, bypassing the address pointer.
    /// Not part of the real chip; useful for tests and debuggers.
    #[inline]
    pub fn vram_value(&self, addr: u16) -> u8 {
        self.vram[(addr & 0x3FFF) as usize]
    }

    /// Write a byte directly into VRAM, bypassing the address pointer and
    /// the data port latch. Not part of the real chip; useful for tests
    /// and scenario setup.
    #[inline]
    pub fn poke_vram(&mut self, addr: u16, value: u8) {
        self.vram[(addr & 0x3FFF) as usize] = value;
    }

    /// The current VRAM address pointer, masked to 14 bits.
    #[inline]
    pub fn address(&self) -> u16 {
        self.address & 0x3FFF
    }
}

impl<Ibx: Inbox<Memo = Memo>> Vdp<Ibx> {
    /// Write a byte to the address/register port.
    ///
    /// The first byte of a pair is latched as the low 8 bits of the address
    /// pointer. The second byte either folds its low 6 bits into the high
    /// bits of the address pointer, or - if its top bit is set - selects a
    /// register (low 3 bits) to receive the low byte *previously latched
    /// into the address pointer by the first byte*, not the second byte
    /// itself.
    pub fn write_address(&mut self, byte: u8) {
        self.inbox.receive(Memo::WriteAddress(byte));
        match self.latch {
            Latch::Low => {
                self.address = u16::from(byte);
                self.latch = Latch::High;
            }
            Latch::High => {
                if byte & 0x80 != 0 {
                    let reg = byte & 0x07;
                    let value = (self.address & 0xFF) as u8;
                    self.registers[reg as usize] = value;
                    self.inbox.receive(Memo::RegisterWrite {
                        register: reg,
                        value,
                    });
                    let new_mode = self.mode_from_registers();
                    if new_mode != self.mode {
                        self.mode = new_mode;
                        self.inbox.receive(Memo::ModeChanged(new_mode));
                    }
                } else {
                    self.address |= (u16::from(byte) & 0x3F) << 8;
                }
                self.latch = Latch::Low;
            }
        }
    }

    /// Write a byte to VRAM at the current address, then advance the
    /// address pointer (wrapping modulo 16384). Does not disturb the
    /// address/register latch phase.
    pub fn write_data(&mut self, byte: u8) {
        self.inbox.receive(Memo::WriteData(byte));
        let addr = self.address & 0x3FFF;
        self.vram[addr as usize] = byte;
        self.address = self.address.wrapping_add(1);
    }

    /// Read a byte from VRAM at the current address, then advance the
    /// address pointer.
    pub fn read_data(&mut self) -> u8 {
        let addr = self.address & 0x3FFF;
        let value = self.vram[addr as usize];
        self.address = self.address.wrapping_add(1);
        self.inbox.receive(Memo::ReadData(value));
        value
    }

    /// Read a byte from VRAM at the current address without advancing the
    /// pointer. Not part of the real chip; a debug accessor.
    #[inline]
    pub fn read_data_no_inc(&self) -> u8 {
        self.vram[(self.address & 0x3FFF) as usize]
    }

    /// Read the status register, then clear its INTERRUPT and COLLISION
    /// bits (FIFTH_SPRITE and the sprite index are left until the next
    /// frame's scanline 0 clears the whole byte).
    pub fn read_status(&mut self) -> u8 {
        let value = self.status;
        self.status &= !(StatusFlags::INTERRUPT.bits() | StatusFlags::COLLISION.bits());
        self.inbox.receive(Memo::ReadStatus(value));
        value
    }
}
