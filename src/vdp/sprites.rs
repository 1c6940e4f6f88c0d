//! The sprite scanline engine (component C4): selects up to four visible
//! sprites per line, renders their pattern bits into the line buffer,
//! tracks 5th-sprite overflow, and flags sprite-to-sprite collisions.
//!
//! Grounded directly on `vrEmuTms9918aOutputSprites` from the original C
//! core, which this is a line-for-line port of.

use super::{Memo, StatusFlags, Vdp, LAST_SPRITE_VPOS, MAX_SCANLINE_SPRITES, MAX_SPRITES};
use crate::color;
use crate::memo::Inbox;

pub(super) fn render<Ibx: Inbox<Memo = Memo>>(
    vdp: &mut Vdp<Ibx>,
    y: u8,
    pixels: &mut [u8; super::SCREEN_WIDTH],
) {
    let sprite_size = vdp.sprite_size_px();
    let magnified = vdp.sprite_magnified();
    let sprite_px = sprite_size * if magnified { 2 } else { 1 };
    let attr_table = vdp.sprite_attr_table_addr();
    let pattern_table = vdp.sprite_pattern_table_addr();

    if y == 0 {
        vdp.status = 0;
    }

    let mut sprites_on_line: u32 = 0;
    let mut row_bits = [false; super::SCREEN_WIDTH];

    for i in 0..MAX_SPRITES {
        let attr_addr = attr_table + u16::from(i) * 4;
        let raw_v_pos = vdp.vram_value(attr_addr);

        if raw_v_pos == LAST_SPRITE_VPOS {
            if !vdp.status_flag(StatusFlags::FIFTH_SPRITE) {
                vdp.status |= i;
            }
            break;
        }

        // Values above -32 (as u8, i.e. > 0xE0) represent vertical
        // positions in -31..-1; fold them onto the signed range before the
        // chip's "+1" bias is applied.
        let mut v_pos = i32::from(raw_v_pos);
        if raw_v_pos > (-32i8) as u8 {
            v_pos -= 256;
        }
        v_pos += 1;

        let mut pattern_row = i32::from(y) - v_pos;
        if magnified {
            pattern_row /= 2;
        }

        if pattern_row < 0 || pattern_row >= i32::from(sprite_size) {
            continue;
        }
        let pattern_row = pattern_row as u16;

        let color_and_flags = vdp.vram_value(attr_addr + 3);
        let sprite_color = color_and_flags & 0x0F;

        if sprites_on_line == 0 {
            row_bits = [false; super::SCREEN_WIDTH];
        }

        sprites_on_line += 1;
        if sprites_on_line > MAX_SCANLINE_SPRITES {
            if !vdp.status_flag(StatusFlags::FIFTH_SPRITE) {
                vdp.status |= StatusFlags::FIFTH_SPRITE.bits() | i;
                vdp.inbox.receive(Memo::FifthSprite { index: i });
            }
            break;
        }

        let pattern_name = u16::from(vdp.vram_value(attr_addr + 2));
        let pattern_addr = pattern_table + pattern_name * 8 + pattern_row;

        let mut h_pos = i32::from(vdp.vram_value(attr_addr + 1));
        if color_and_flags & 0x80 != 0 {
            h_pos -= 32;
        }

        let mut pattern_byte = vdp.vram_value(pattern_addr);
        let mut screen_bit: u32 = 0;
        let mut pattern_bit: u32 = 0;

        let mut screen_x = h_pos;
        while screen_x < h_pos + i32::from(sprite_px) {
            if screen_x >= super::SCREEN_WIDTH as i32 {
                break;
            }
            if screen_x >= 0 {
                if pattern_byte & (0x80 >> pattern_bit) != 0 {
                    let sx = screen_x as usize;
                    if sprite_color != color::TRANSPARENT {
                        pixels[sx] = sprite_color;
                    }
                    if row_bits[sx] {
                        if !vdp.status_flag(StatusFlags::COLLISION) {
                            vdp.inbox.receive(Memo::SpriteCollision);
                        }
                        vdp.status |= StatusFlags::COLLISION.bits();
                    }
                    row_bits[sx] = true;
                }
            }

            if !magnified || screen_bit & 1 != 0 {
                pattern_bit += 1;
                if pattern_bit == 8 {
                    pattern_bit = 0;
                    pattern_byte = vdp.vram_value(pattern_addr + 16);
                }
            }
            screen_bit += 1;
            screen_x += 1;
        }
    }
}

impl<Ibx> Vdp<Ibx> {
    #[inline]
    fn status_flag(&self, flag: StatusFlags) -> bool {
        self.status & flag.bits() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdp::SCREEN_WIDTH;

    fn place_sprite(vdp: &mut Vdp, slot: u16, v: u8, h: u8, name: u8, color: u8) {
        let base = 0; // default sprite attribute table at VRAM 0
        vdp.poke_vram(base + slot * 4, v);
        vdp.poke_vram(base + slot * 4 + 1, h);
        vdp.poke_vram(base + slot * 4 + 2, name);
        vdp.poke_vram(base + slot * 4 + 3, color);
    }

    fn solid_8x8_pattern(vdp: &mut Vdp, name: u8) {
        for row in 0..8 {
            vdp.poke_vram(u16::from(name) * 8 + row, 0xFF);
        }
    }

    #[test]
    fn fifth_sprite_sets_overflow_and_index() {
        let mut vdp = Vdp::new();
        for slot in 0..5u16 {
            place_sprite(&mut vdp, slot, 63, 8 * slot as u8, 0, 0x0F);
            solid_8x8_pattern(&mut vdp, 0);
        }
        place_sprite(&mut vdp, 5, 0xD0, 0, 0, 0);

        let mut pixels = [0u8; SCREEN_WIDTH];
        render(&mut vdp, 64, &mut pixels);

        assert!(vdp.status_flag(StatusFlags::FIFTH_SPRITE));
        assert_eq!(vdp.status & 0x1F, 4);
    }

    #[test]
    fn overlapping_sprites_set_collision() {
        let mut vdp = Vdp::new();
        place_sprite(&mut vdp, 0, 63, 64, 0, 0x0F);
        place_sprite(&mut vdp, 1, 63, 64, 0, 0x0F);
        place_sprite(&mut vdp, 2, 0xD0, 0, 0, 0);
        solid_8x8_pattern(&mut vdp, 0);

        let mut pixels = [0u8; SCREEN_WIDTH];
        render(&mut vdp, 64, &mut pixels);

        assert!(vdp.status_flag(StatusFlags::COLLISION));
        assert_eq!(pixels[64], 0x0F);
    }

    #[test]
    fn early_clock_shifts_sprite_left() {
        let mut vdp = Vdp::new();
        place_sprite(&mut vdp, 0, 63, 32, 0, 0x8F); // early clock bit set
        place_sprite(&mut vdp, 1, 0xD0, 0, 0, 0);
        solid_8x8_pattern(&mut vdp, 0);

        let mut pixels = [0u8; SCREEN_WIDTH];
        render(&mut vdp, 64, &mut pixels);

        // hPos 32 - 32 = 0, so the pattern's leftmost column lands at x=0.
        assert_eq!(pixels[0], 0x0F);
    }

    #[test]
    fn transparent_sprite_still_counts_for_collision() {
        let mut vdp = Vdp::new();
        place_sprite(&mut vdp, 0, 63, 64, 0, 0x00); // transparent
        place_sprite(&mut vdp, 1, 63, 64, 0, 0x0F);
        place_sprite(&mut vdp, 2, 0xD0, 0, 0, 0);
        solid_8x8_pattern(&mut vdp, 0);

        let mut pixels = [7u8; SCREEN_WIDTH];
        render(&mut vdp, 64, &mut pixels);

        assert!(vdp.status_flag(StatusFlags::COLLISION));
        // the transparent sprite never wrote a color; only the second did
        assert_eq!(pixels[64], 0x0F);
    }

    #[test]
    fn scanline_zero_clears_status() {
        let mut vdp = Vdp::new();
        vdp.status = 0xFF;
        place_sprite(&mut vdp, 0, 0xD0, 0, 0, 0);
        let mut pixels = [0u8; SCREEN_WIDTH];
        render(&mut vdp, 0, &mut pixels);
        assert_eq!(vdp.status, 0);
    }
}
