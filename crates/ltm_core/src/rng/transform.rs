//! Elapsed-time to RNG transform.
//!
//! The target reseeds its generator from the elapsed-time counter in
//! microseconds. These functions reproduce that transform bit for bit,
//! including 32-bit wraparound, so every intermediate uses wrapping
//! arithmetic on `u32`.

/// Multiplier of the generator's linear congruential step.
const LCG_MULTIPLIER: u32 = 0x343FD;
/// Increment of the generator's linear congruential step.
const LCG_INCREMENT: u32 = 0x269EC3;

/// Derive the 32-bit seed for an elapsed-time value.
///
/// The counter is logically 64 bits wide; only the low 32 bits of each
/// term survive, so the high word contributes through a wrapping add.
pub fn micros_to_seed(micros: u64) -> u32 {
    let low = micros as u32;
    let high = (micros >> 32) as u32;

    // (low << 16 | low >> 16) truncated to 32 bits is a 16-bit rotation.
    low.rotate_left(16) ^ high.wrapping_add(low)
}

/// Derive the 16-bit state index for a seed.
///
/// Bits 16..32 of `seed * 0x343FD + 0x269EC3` depend only on the low
/// 32 bits of the product, so wrapping `u32` math is exact here.
pub fn seed_to_state(seed: u32) -> u16 {
    let mixed = seed
        .wrapping_mul(LCG_MULTIPLIER)
        .wrapping_add(LCG_INCREMENT);
    (mixed >> 16) as u16
}

/// Derive the state index for an elapsed-time value.
pub fn micros_to_state(micros: u64) -> u16 {
    seed_to_state(micros_to_seed(micros))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_seeds() {
        assert_eq!(micros_to_seed(0), 0);
        assert_eq!(micros_to_seed(1), 65_537);
        assert_eq!(micros_to_seed(2), 131_074);
        assert_eq!(micros_to_seed(1_000), 65_537_000);
        assert_eq!(micros_to_seed(123_456), 3_795_968_577);
        assert_eq!(micros_to_seed(5_000_000), 1_259_096_844);
    }

    #[test]
    fn known_states() {
        assert_eq!(micros_to_state(0), 38);
        assert_eq!(micros_to_state(1), 17_446);
        assert_eq!(micros_to_state(1_000), 41_264);
        assert_eq!(micros_to_state(5_000_000), 17_428);
        assert_eq!(micros_to_state(1_033_333), 40_020);
    }

    #[test]
    fn first_states_match_reference_sequence() {
        let states: Vec<u16> = (0..12).map(micros_to_state).collect();
        assert_eq!(
            states,
            vec![38, 17446, 34855, 52263, 4135, 21543, 38952, 56360, 8232, 25641, 43049, 60457]
        );
    }

    #[test]
    fn all_ones_low_word_cancels_out() {
        // rotate(0xFFFFFFFF) ^ (0 + 0xFFFFFFFF) == 0
        assert_eq!(micros_to_seed(u32::MAX as u64), 0);
        assert_eq!(micros_to_state(u32::MAX as u64), 38);
    }

    #[test]
    fn high_word_feeds_through_wrapping_add() {
        let micros = (1u64 << 32) + 5;
        assert_eq!(micros_to_seed(micros), 327_686);
        assert_eq!(micros_to_state(micros), 21_547);
    }

    #[test]
    fn state_is_deterministic_over_low_word() {
        for micros in [0u64, 7, 65_535, 65_536, 1 << 31, u32::MAX as u64] {
            assert_eq!(micros_to_state(micros), micros_to_state(micros));
            assert_eq!(
                micros_to_state(micros),
                seed_to_state(micros_to_seed(micros & 0xFFFF_FFFF))
            );
        }
    }
}
