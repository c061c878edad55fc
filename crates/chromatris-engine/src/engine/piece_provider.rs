use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Piece, PieceKind};

/// Source of the pieces a [`Board`](crate::Board) spawns.
pub trait PieceProvider: fmt::Debug {
    /// Consumes and returns the next piece.
    fn get_piece(&mut self) -> Piece;

    /// Returns the piece the next [`get_piece`](Self::get_piece) call will
    /// produce, without consuming it.
    fn next_piece(&self) -> Piece;
}

/// Supplies pieces using the 7-bag system.
///
/// # 7-Bag System
///
/// 1. A "bag" holds one of each of the 7 piece kinds
/// 2. The bag is shuffled
/// 3. Pieces are drawn in order from the bag
/// 4. A fresh shuffled bag is appended when 7 or fewer pieces remain
///
/// Every kind appears exactly once per bag, so no kind is ever absent from
/// 13 consecutive draws.
///
/// # Example
///
/// ```
/// use chromatris_engine::{BagPieceProvider, GameSeed, PieceProvider as _};
///
/// let mut provider = BagPieceProvider::with_seed(GameSeed::from_bytes([1; 16]));
///
/// let upcoming = provider.next_piece();
/// assert_eq!(provider.get_piece(), upcoming);
/// let preview: Vec<_> = provider.next_kinds().take(5).collect();
/// assert_eq!(preview.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct BagPieceProvider {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl Default for BagPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl BagPieceProvider {
    /// Creates a provider with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(seed: GameSeed) -> Self {
        Self::with_rng(seed.rng())
    }

    #[must_use]
    pub fn with_rng(rng: Pcg32) -> Self {
        let mut this = Self {
            rng,
            bag: VecDeque::with_capacity(PieceKind::LEN * 2),
        };
        this.fill_bag();
        this
    }

    /// Refills when the bag has 7 or fewer pieces remaining, so that a full
    /// bag of lookahead survives the next draw.
    fn fill_bag(&mut self) {
        while self.bag.len() <= PieceKind::LEN {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Draws the next piece kind from the bag.
    ///
    /// # Panics
    ///
    /// Panics if the bag is empty (should never happen with proper refill logic).
    pub fn pop_next(&mut self) -> PieceKind {
        let kind = self
            .bag
            .pop_front()
            .expect("piece bag should never be empty");
        self.fill_bag();
        kind
    }

    /// Returns an iterator over the upcoming piece kinds.
    ///
    /// The iterator always yields at least 8 kinds.
    pub fn next_kinds(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }
}

impl PieceProvider for BagPieceProvider {
    fn get_piece(&mut self) -> Piece {
        Piece::from_kind(self.pop_next())
    }

    fn next_piece(&self) -> Piece {
        Piece::from_kind(self.bag[0])
    }
}

/// Cycles through a fixed list of piece kinds.
///
/// Useful for replays, puzzles and tests that need a known sequence.
#[derive(Debug, Clone)]
pub struct SequencePieceProvider {
    kinds: Vec<PieceKind>,
    index: usize,
}

impl SequencePieceProvider {
    /// # Panics
    ///
    /// Panics if `kinds` is empty.
    #[must_use]
    pub fn new(kinds: Vec<PieceKind>) -> Self {
        assert!(!kinds.is_empty(), "piece sequence must not be empty");
        Self { kinds, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn get_piece(&mut self) -> Piece {
        let piece = self.next_piece();
        self.index = (self.index + 1) % self.kinds.len();
        piece
    }

    fn next_piece(&self) -> Piece {
        Piece::from_kind(self.kinds[self.index])
    }
}

/// Seed for a deterministic game.
///
/// This is a 128-bit (16-byte) seed. One seed drives both the piece sequence
/// and the board's tie-breaking choices, so two games started from the same
/// seed and fed the same inputs play out identically. Serialized as a
/// 32-character hex string.
///
/// # Example
///
/// ```
/// use chromatris_engine::GameSeed;
/// use rand::Rng as _;
///
/// let seed: GameSeed = rand::rng().random();
/// let parsed: GameSeed = seed.to_string().parse().unwrap();
/// assert_eq!(seed, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSeed([u8; 16]);

/// Error returned when a seed is not 32 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed: {input:?} ({reason})")]
pub struct ParseSeedError {
    input: String,
    reason: String,
}

impl GameSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates the generator this seed stands for.
    #[must_use]
    pub fn rng(&self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl fmt::Display for GameSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for GameSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = |reason: String| ParseSeedError {
            input: s.to_owned(),
            reason,
        };
        if s.len() != 32 {
            return Err(error(format!("expected 32 characters, got {}", s.len())));
        }
        let num = u128::from_str_radix(s, 16).map_err(|e| error(e.to_string()))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for GameSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GameSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `GameSeed` values with `rng.random()`.
impl Distribution<GameSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> GameSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        GameSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: GameSeed = GameSeed([
        0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
        0x88,
    ]);

    #[test]
    fn test_every_kind_within_thirteen_draws() {
        for seed_byte in 0..16 {
            let mut provider = BagPieceProvider::with_seed(GameSeed([seed_byte; 16]));
            let draws: Vec<_> = (0..200).map(|_| provider.pop_next()).collect();
            for window in draws.windows(13) {
                for kind in PieceKind::ALL {
                    assert!(window.contains(&kind), "{kind:?} starved in {window:?}");
                }
            }
        }
    }

    #[test]
    fn test_each_bag_holds_one_of_each_kind() {
        let mut provider = BagPieceProvider::with_seed(SEED);
        for _ in 0..5 {
            let mut bag: Vec<_> = (0..PieceKind::LEN).map(|_| provider.pop_next()).collect();
            bag.sort_unstable();
            assert_eq!(bag, PieceKind::ALL);
        }
    }

    #[test]
    fn test_peek_matches_next_draw() {
        let mut provider = BagPieceProvider::with_seed(SEED);
        for _ in 0..30 {
            let peeked = provider.next_piece();
            assert_eq!(provider.get_piece(), peeked);
        }
    }

    #[test]
    fn test_lookahead_always_covers_a_full_bag() {
        let mut provider = BagPieceProvider::with_seed(SEED);
        for _ in 0..30 {
            assert!(provider.next_kinds().count() > PieceKind::LEN);
            provider.pop_next();
        }
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let mut provider1 = BagPieceProvider::with_seed(SEED);
        let mut provider2 = BagPieceProvider::with_seed(SEED);
        for _ in 0..20 {
            assert_eq!(provider1.pop_next(), provider2.pop_next());
        }
    }

    #[test]
    fn test_sequence_provider_cycles() {
        let mut provider = SequencePieceProvider::new(vec![PieceKind::T, PieceKind::O]);
        let kinds: Vec<_> = (0..5).map(|_| provider.get_piece().kind()).collect();
        assert_eq!(
            kinds,
            [
                PieceKind::T,
                PieceKind::O,
                PieceKind::T,
                PieceKind::O,
                PieceKind::T
            ]
        );
        assert_eq!(provider.next_piece().kind(), PieceKind::O);
    }

    mod game_seed_serialization {
        use super::*;

        #[test]
        fn test_known_value_sequential_bytes() {
            let seed = GameSeed([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76,
                0x54, 0x32, 0x10,
            ]);
            let serialized = serde_json::to_string(&seed).unwrap();
            assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");

            let deserialized: GameSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(deserialized, seed);
        }

        #[test]
        fn test_accepts_uppercase_hex() {
            let seed: GameSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
            assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
        }

        #[test]
        fn test_rejects_wrong_length_and_bad_digits() {
            for input in [
                "",
                "0123456789abcdef0123456789abcde",
                "0123456789abcdef0123456789abcdef0",
                "ghijklmnopqrstuvwxyzghijklmnopqr",
            ] {
                let err = input.parse::<GameSeed>().unwrap_err();
                assert!(err.to_string().contains("invalid hex"), "{input}");
                assert!(serde_json::from_str::<GameSeed>(&format!("\"{input}\"")).is_err());
            }
        }
    }
}
