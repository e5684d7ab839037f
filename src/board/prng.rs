/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Four random u64 values.
const SEEDS: [u64; 4] = [
    0b1001000111000101101010110011110011101011111111010101101001110001,
    0b0000011010111010001001010011101110011101110110001001011111001101,
    0b1000000000010101101101011110010110011100110000100111010111101001,
    0b1111100011110100001001111111110001010100000100011101111001010011,
];

/// A pseudo-random number generator using the "xoshiro256**" algorithm.
///
/// There is no global generator. Every consumer owns its own seeded instance,
/// so the sequence it draws is reproducible.
///
/// Algorithm from <https://prng.di.unimi.it/xoshiro256starstar.c>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XoShiRo([u64; 4]);

impl XoShiRo {
    /// Construct a new pseudo-random number generator from the library's seeds.
    #[inline(always)]
    pub const fn new() -> Self {
        Self::from_seeds(SEEDS)
    }

    /// Construct a new pseudo-random number generator from your own seeds.
    #[inline(always)]
    pub const fn from_seeds(seeds: [u64; 4]) -> Self {
        Self(seeds)
    }

    /// Construct a generator from a single `u64`, expanding it into four words with SplitMix64.
    ///
    /// # Example
    /// ```
    /// # use newt::XoShiRo;
    /// let mut a = XoShiRo::from_seed(42);
    /// let mut b = XoShiRo::from_seed(42);
    /// assert_eq!(a.next_u64(), b.next_u64());
    /// ```
    pub const fn from_seed(seed: u64) -> Self {
        let mut state = seed;
        let mut seeds = [0; 4];
        let mut i = 0;
        while i < seeds.len() {
            state = state.wrapping_add(0x9E3779B97F4A7C15);
            let mut z = state;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
            seeds[i] = z ^ (z >> 31);
            i += 1;
        }
        Self(seeds)
    }

    /// `const` analog of [`XoShiRo::next_u64`], returning `(next, Self)`.
    #[inline(always)]
    pub const fn get_next_const(self) -> (u64, Self) {
        let (result, s) = Self::xoshiro(self.0);
        (result, Self(s))
    }

    /// Draws the next number in the sequence.
    #[inline(always)]
    pub fn next_u64(&mut self) -> u64 {
        let (result, s) = Self::xoshiro(self.0);
        self.0 = s;
        result
    }

    /// Draws a number with few set bits, by AND-ing three draws together.
    ///
    /// Sparse numbers make much better candidates when searching for magic numbers.
    #[inline(always)]
    pub fn next_sparse_u64(&mut self) -> u64 {
        self.next_u64() & self.next_u64() & self.next_u64()
    }

    /// Inner function for computing the next pseudo-random number in the sequence.
    const fn xoshiro(mut s: [u64; 4]) -> (u64, [u64; 4]) {
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);

        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];

        s[2] ^= t;

        s[3] = s[3].rotate_left(45);
        (result, s)
    }
}

impl Default for XoShiRo {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_and_mut_sequences_agree() {
        let mut rng = XoShiRo::new();
        let (first, next) = XoShiRo::new().get_next_const();
        let (second, _) = next.get_next_const();

        assert_eq!(rng.next_u64(), first);
        assert_eq!(rng.next_u64(), second);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = XoShiRo::from_seed(1);
        let mut b = XoShiRo::from_seed(2);
        assert_ne!(a.next_u64(), b.next_u64());
    }
}
