//! The public scanline dispatcher (component C6): blanking, mode
//! selection, background+sprite composition, and the frame interrupt.
//!
//! Grounded on `vrEmuTms9918aScanLine` in the original C core and on the
//! mode-dispatch match in `euphrates`'s `sms_vdp::graphics::draw_line`.

use super::{Memo, Mode, Vdp, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::memo::Inbox;

use super::{modes, sprites, StatusFlags};

/// Renders scanline `y` into `pixels`, a 256-byte buffer of indexed colors.
///
/// `y` outside `0..SCREEN_HEIGHT` is treated as part of the (non-visible)
/// blanking interval: the buffer is filled with the backdrop color and no
/// other state changes.
pub fn scanline<Ibx: Inbox<Memo = Memo>>(
    vdp: &mut Vdp<Ibx>,
    y: u8,
    pixels: &mut [u8; SCREEN_WIDTH],
) {
    if !vdp.display_enabled() || usize::from(y) >= SCREEN_HEIGHT {
        let backdrop = vdp.main_bg_color();
        for p in pixels.iter_mut() {
            *p = backdrop;
        }
        return;
    }

    match vdp.mode() {
        Mode::GraphicsI => {
            modes::graphics1(vdp, y, pixels);
            sprites::render(vdp, y, pixels);
        }
        Mode::GraphicsII => {
            modes::graphics2(vdp, y, pixels);
            sprites::render(vdp, y, pixels);
        }
        Mode::Multicolor => {
            modes::multicolor(vdp, y, pixels);
            sprites::render(vdp, y, pixels);
        }
        Mode::Text => {
            modes::text(vdp, y, pixels);
        }
    }

    if usize::from(y) == SCREEN_HEIGHT - 1 {
        vdp.status |= StatusFlags::INTERRUPT.bits();
        vdp.inbox.receive(Memo::FrameInterrupt);
    }
}
