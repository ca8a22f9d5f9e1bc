//! Deterministic random number generation for a single battle.
//!
//! Every battle owns one [`BattleRng`]. Its full state lives inside
//! `BattleState`, so a suspended battle resumes the exact same dice stream.
//! No global or thread-local generator exists anywhere in the engine.

/// PCG-XSH-RR generator (64-bit state, 32-bit output).
///
/// # Properties
///
/// - **Deterministic**: Same seed always produces the same sequence
/// - **Small state**: One `u64`, cheap to snapshot
/// - **Good quality**: Passes PractRand/TestU01 for game purposes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleRng {
    state: u64,
}

impl BattleRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        // Scramble so that small consecutive seeds diverge immediately.
        let mut rng = Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        };
        rng.next_u32();
        rng
    }

    /// Restores a generator from a previously captured raw state.
    pub const fn from_state(state: u64) -> Self {
        Self { state }
    }

    pub const fn state(&self) -> u64 {
        self.state
    }

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::step(old);
        Self::output(old)
    }

    /// Rolls a die with `sides` faces (1..=sides). Zero sides yields 1.
    pub fn roll_die(&mut self, sides: u32) -> u32 {
        if sides <= 1 {
            return 1;
        }
        (self.next_u32() % sides) + 1
    }

    /// Uniform value in `[0, upper)`. Returns 0 for an empty range.
    pub fn below(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        (self.next_u32() as usize) % upper
    }

    /// Returns true with the given probability in percent (clamped to 0..=100).
    pub fn chance(&mut self, percent: u32) -> bool {
        if percent == 0 {
            return false;
        }
        self.roll_die(100) <= percent.min(100)
    }

    /// Fisher-Yates shuffle driven by this generator.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}

/// Compute a deterministic seed from independent components.
///
/// Used to derive per-battle seeds from a base seed plus encounter data, so
/// that no two battles share a dice stream unless every input matches.
pub fn compute_seed(base_seed: u64, a: u64, b: u64, c: u64) -> u64 {
    let mut hash = base_seed;

    hash ^= a.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= b.wrapping_mul(0x517cc1b727220a95);
    hash ^= c.wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
