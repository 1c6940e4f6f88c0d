//! Property-style tests over randomized byte sequences and addresses,
//! exercising the universal quantifications from the specification (round
//! trips through VRAM, register masking, reset invariants) rather than a
//! fixed table of examples.

use rand::Rng;

use tms9918::vdp::{Mode, Vdp};

fn set_address(vdp: &mut Vdp, addr: u16) {
    vdp.write_address((addr & 0xFF) as u8);
    vdp.write_address(((addr >> 8) & 0x3F) as u8);
}

#[test]
fn vram_round_trips_through_random_byte_sequences() {
    let mut rng = rand::thread_rng();

    for _ in 0..50 {
        let mut vdp = Vdp::new();
        let start_addr: u16 = rng.gen_range(0, 0x4000);
        let len: usize = rng.gen_range(1, 512);
        let bytes: Vec<u8> = (0..len).map(|_| rng.gen()).collect();

        set_address(&mut vdp, start_addr);
        for &b in &bytes {
            vdp.write_data(b);
        }

        set_address(&mut vdp, start_addr);
        for &expected in &bytes {
            assert_eq!(vdp.read_data(), expected);
        }
    }
}

#[test]
fn register_writes_are_observable_masked_to_three_bits() {
    let mut rng = rand::thread_rng();

    for _ in 0..100 {
        let mut vdp = Vdp::new();
        let low_byte: u8 = rng.gen();
        let reg_index: u8 = rng.gen();

        vdp.write_address(low_byte);
        vdp.write_address(0x80 | reg_index);

        assert_eq!(vdp.register(reg_index), low_byte);
        assert_eq!(vdp.register(reg_index & 0x07), vdp.register(reg_index));
    }
}

#[test]
fn reset_always_restores_power_on_state_regardless_of_prior_activity() {
    let mut rng = rand::thread_rng();
    let mut vdp = Vdp::new();

    for _ in 0..200 {
        let op: u8 = rng.gen_range(0, 4);
        match op {
            0 => vdp.write_address(rng.gen()),
            1 => vdp.write_data(rng.gen()),
            2 => {
                let _ = vdp.read_data();
            }
            _ => {
                let _ = vdp.read_status();
            }
        }
    }

    vdp.reset();

    assert_eq!(vdp.vram_value(0), 0xFF);
    assert_eq!(vdp.vram_value(0x3FFF), 0xFF);
    for i in 0..8 {
        assert_eq!(vdp.register(i), 0);
    }
    assert_eq!(vdp.address(), 0);
    assert_eq!(vdp.mode(), Mode::GraphicsI);
}

#[test]
fn address_pointer_stays_within_14_bits_under_random_increments() {
    let mut rng = rand::thread_rng();
    let mut vdp = Vdp::new();

    let start_addr: u16 = rng.gen_range(0, 0x4000);
    set_address(&mut vdp, start_addr);

    let steps: u32 = rng.gen_range(1, 40000);
    for _ in 0..steps {
        vdp.write_data(0);
    }

    assert!(vdp.address() < 0x4000);
    assert_eq!(
        vdp.address(),
        ((u32::from(start_addr) + steps) % 0x4000) as u16
    );
}
