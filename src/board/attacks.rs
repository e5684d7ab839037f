/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::LazyLock;

use super::{Bitboard, Color, PieceKind, Square, XoShiRo};

/// Upper bound on the number of candidates tried per square when searching for a magic number.
const MAX_MAGIC_TRIALS: usize = 100_000_000;

/// Seed of the generator used to search for Rook magics.
const ROOK_MAGIC_SEED: u64 = 0x5EED_0F_C0FFEE_01;

/// Seed of the generator used to search for Bishop magics.
const BISHOP_MAGIC_SEED: u64 = 0x5EED_0F_C0FFEE_02;

/// Deltas for the movement of the Queen.
const QUEEN_DELTAS: [(i8, i8); 8] = [
    /* Rook */
    (1, 0),
    (0, -1),
    (-1, 0),
    (0, 1),
    /* Bishop */
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

/// Deltas for the movement of the Rook.
pub const ROOK_DELTAS: [(i8, i8); 4] = [
    QUEEN_DELTAS[0],
    QUEEN_DELTAS[1],
    QUEEN_DELTAS[2],
    QUEEN_DELTAS[3],
];

/// Deltas for the movement of the Bishop.
pub const BISHOP_DELTAS: [(i8, i8); 4] = [
    QUEEN_DELTAS[4],
    QUEEN_DELTAS[5],
    QUEEN_DELTAS[6],
    QUEEN_DELTAS[7],
];

/// Deltas for the movement of the Knight.
const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (1, -2),
    (2, 1),
    (2, -1),
    (-1, 2),
    (-1, -2),
    (-2, 1),
    (-2, -1),
];

const KNIGHT_ATTACKS: [Bitboard; Square::COUNT] = generate_leaper_mobility(&KNIGHT_DELTAS);
const KING_ATTACKS: [Bitboard; Square::COUNT] = generate_leaper_mobility(&QUEEN_DELTAS);
const WHITE_PAWN_ATTACKS: [Bitboard; Square::COUNT] = generate_pawn_attacks(Color::White);
const BLACK_PAWN_ATTACKS: [Bitboard; Square::COUNT] = generate_pawn_attacks(Color::Black);
const ROOK_MASKS: [Bitboard; Square::COUNT] = generate_relevance_masks(&ROOK_DELTAS);
const BISHOP_MASKS: [Bitboard; Square::COUNT] = generate_relevance_masks(&BISHOP_DELTAS);

/// Sliding-piece lookup tables, built on first use.
static MAGICS: LazyLock<MagicTables> = LazyLock::new(MagicTables::new);

/// Attack functions of every [`Piece`](super::Piece), indexed by [`Piece::index`](super::Piece::index).
pub(crate) const ATTACK_FNS: [fn(Square, Bitboard) -> Bitboard; 12] = [
    |sq, _| pawn_attacks(sq, Color::White),
    |sq, _| knight_attacks(sq),
    bishop_attacks,
    rook_attacks,
    queen_attacks,
    |sq, _| king_attacks(sq),
    |sq, _| pawn_attacks(sq, Color::Black),
    |sq, _| knight_attacks(sq),
    bishop_attacks,
    rook_attacks,
    queen_attacks,
    |sq, _| king_attacks(sq),
];

/// Forces construction of the sliding-piece attack tables.
///
/// Calling this is optional, as the tables are built on first use anyway.
/// It exists so that the cost of building them can be paid up front, before timing anything.
#[inline(always)]
pub fn init() {
    LazyLock::force(&MAGICS);
}

/// Fetch the attacks of a piece of `kind` and `color` at `square`, given `occupancy` as the set of blockers.
///
/// Pawns only yield their diagonal captures, never their pushes.
///
/// # Example
/// ```
/// # use newt::*;
/// let attacks = attacks_for(PieceKind::Rook, Color::White, Square::A1, Square::A3.bitboard());
/// assert_eq!(attacks.population(), 9);
/// ```
#[inline(always)]
pub fn attacks_for(kind: PieceKind, color: Color, square: Square, occupancy: Bitboard) -> Bitboard {
    match kind {
        PieceKind::Pawn => pawn_attacks(square, color),
        PieceKind::Knight => knight_attacks(square),
        PieceKind::Bishop => bishop_attacks(square, occupancy),
        PieceKind::Rook => rook_attacks(square, occupancy),
        PieceKind::Queen => queen_attacks(square, occupancy),
        PieceKind::King => king_attacks(square),
    }
}

/// Computes the attacks for a Rook at `square` with the provided blockers.
///
/// The first blocker along each ray is included, so it may be captured.
#[inline(always)]
pub fn rook_attacks(square: Square, blockers: Bitboard) -> Bitboard {
    MAGICS.rook_attacks(square, blockers)
}

/// Computes the attacks for a Bishop at `square` with the provided blockers.
#[inline(always)]
pub fn bishop_attacks(square: Square, blockers: Bitboard) -> Bitboard {
    MAGICS.bishop_attacks(square, blockers)
}

/// Computes the attacks for a Queen at `square` with the provided blockers.
#[inline(always)]
pub fn queen_attacks(square: Square, blockers: Bitboard) -> Bitboard {
    let tables = &*MAGICS;
    tables.rook_attacks(square, blockers) | tables.bishop_attacks(square, blockers)
}

/// Fetch the raw attacks for a knight on the provided square.
#[inline(always)]
pub const fn knight_attacks(square: Square) -> Bitboard {
    KNIGHT_ATTACKS[square.index()]
}

/// Fetch the raw attacks for a king on the provided square.
#[inline(always)]
pub const fn king_attacks(square: Square) -> Bitboard {
    KING_ATTACKS[square.index()]
}

/// Fetch the diagonal capture squares for a pawn of the provided color on the provided square.
#[inline(always)]
pub const fn pawn_attacks(square: Square, color: Color) -> Bitboard {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[square.index()],
        Color::Black => BLACK_PAWN_ATTACKS[square.index()],
    }
}

/// Brute-force attacks of a sliding piece: walk each ray of `deltas` until a blocker or the board's edge.
///
/// This is what the magic tables are built from, and is far slower than looking them up.
///
/// # Example
/// ```
/// # use newt::*;
/// let blockers = Square::D6.bitboard();
/// assert_eq!(ray_attacks(Square::D4, blockers, &ROOK_DELTAS), rook_attacks(Square::D4, blockers));
/// ```
pub const fn ray_attacks(square: Square, occupancy: Bitboard, deltas: &[(i8, i8)]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY_BOARD;

    let mut j = 0;
    while j < deltas.len() {
        let (df, dr) = deltas[j];
        let mut ray = square;

        while let Some(shifted) = ray.offset(df, dr) {
            attacks = attacks.or(shifted.bitboard());

            // The blocker itself is attacked, but nothing beyond it
            if occupancy.get(shifted) {
                break;
            }
            ray = shifted;
        }

        j += 1;
    }

    attacks
}

/// Relevant-occupancy mask of a Rook at `square`.
#[inline(always)]
pub const fn rook_mask(square: Square) -> Bitboard {
    ROOK_MASKS[square.index()]
}

/// Relevant-occupancy mask of a Bishop at `square`.
#[inline(always)]
pub const fn bishop_mask(square: Square) -> Bitboard {
    BISHOP_MASKS[square.index()]
}

/// Generates the diagonal-forward capture squares for pawns of `color`.
const fn generate_pawn_attacks(color: Color) -> [Bitboard; Square::COUNT] {
    let mut boards = [Bitboard::EMPTY_BOARD; Square::COUNT];
    let mut i = 0;
    while i < Square::COUNT {
        let bb = Bitboard::from_square(Square::from_index_unchecked(i));

        boards[i] = match color {
            Color::White => bb.northeast().or(bb.northwest()),
            Color::Black => bb.southeast().or(bb.southwest()),
        };
        i += 1;
    }
    boards
}

/// Generates the moves from every location for the "Leaper" pieces.
/// Leapers may "leap" or "jump" to a square a specified distance away.
///
/// In standard chess, the Leapers are the King and Knight.
const fn generate_leaper_mobility(deltas: &[(i8, i8)]) -> [Bitboard; Square::COUNT] {
    let mut mobility = [Bitboard::EMPTY_BOARD; Square::COUNT];

    let mut i = 0;
    while i < Square::COUNT {
        let square = Square::from_index_unchecked(i);
        let mut movement = Bitboard::EMPTY_BOARD;

        let mut j = 0;
        while j < deltas.len() {
            let (df, dr) = deltas[j];
            // Deltas that would leave the board are skipped, which is what prevents wrap-around
            if let Some(shifted) = square.offset(df, dr) {
                movement = movement.or(shifted.bitboard());
            }

            j += 1;
        }

        mobility[i] = movement;
        i += 1;
    }

    mobility
}

/// Generates the relevant-occupancy masks for the "Rider" pieces.
///
/// A blocker on the last square of a ray cannot hide anything behind it,
/// so that square is left out of the mask.
const fn generate_relevance_masks(deltas: &[(i8, i8)]) -> [Bitboard; Square::COUNT] {
    let mut masks = [Bitboard::EMPTY_BOARD; Square::COUNT];

    let mut i = 0;
    while i < Square::COUNT {
        let square = Square::from_index_unchecked(i);
        let mut mask = Bitboard::EMPTY_BOARD;

        let mut j = 0;
        while j < deltas.len() {
            let (df, dr) = deltas[j];
            let mut ray = square;

            while let Some(shifted) = ray.offset(df, dr) {
                if shifted.offset(df, dr).is_none() {
                    break;
                }
                mask = mask.or(shifted.bitboard());
                ray = shifted;
            }

            j += 1;
        }

        masks[i] = mask;
        i += 1;
    }

    masks
}

/// Hashing parameters of a single square's slice of a magic table.
#[derive(Debug, Clone, Copy, Default)]
struct MagicEntry {
    /// Relevant occupancy of the square.
    mask: u64,

    /// Multiplier that maps every relevant occupancy to a unique (or harmlessly shared) index.
    magic: u64,

    /// `64 - popcount(mask)`.
    shift: u8,

    /// Start of this square's slice in the shared attack table.
    offset: usize,
}

impl MagicEntry {
    /// Maps `blockers` to an index into the shared attack table.
    #[inline(always)]
    const fn index(&self, blockers: Bitboard) -> usize {
        let blockers = blockers.inner() & self.mask;
        let hash = blockers.wrapping_mul(self.magic);
        self.offset + (hash >> self.shift) as usize
    }
}

/// Magic-number lookup tables for Rooks and Bishops.
struct MagicTables {
    rook_entries: [MagicEntry; Square::COUNT],
    bishop_entries: [MagicEntry; Square::COUNT],
    rook_moves: Vec<Bitboard>,
    bishop_moves: Vec<Bitboard>,
}

impl MagicTables {
    /// Searches for magic numbers and fills the attack tables.
    ///
    /// Deterministic, since both generators are seeded with constants.
    fn new() -> Self {
        let (rook_entries, rook_moves) = Self::build(
            &ROOK_DELTAS,
            &ROOK_MASKS,
            &mut XoShiRo::from_seed(ROOK_MAGIC_SEED),
        );
        let (bishop_entries, bishop_moves) = Self::build(
            &BISHOP_DELTAS,
            &BISHOP_MASKS,
            &mut XoShiRo::from_seed(BISHOP_MAGIC_SEED),
        );

        Self {
            rook_entries,
            bishop_entries,
            rook_moves,
            bishop_moves,
        }
    }

    #[inline(always)]
    fn rook_attacks(&self, square: Square, blockers: Bitboard) -> Bitboard {
        self.rook_moves[self.rook_entries[square.index()].index(blockers)]
    }

    #[inline(always)]
    fn bishop_attacks(&self, square: Square, blockers: Bitboard) -> Bitboard {
        self.bishop_moves[self.bishop_entries[square.index()].index(blockers)]
    }

    /// Builds one slider's entries and its shared attack table.
    fn build(
        deltas: &[(i8, i8)],
        masks: &[Bitboard; Square::COUNT],
        rng: &mut XoShiRo,
    ) -> ([MagicEntry; Square::COUNT], Vec<Bitboard>) {
        let mut entries = [MagicEntry::default(); Square::COUNT];
        let mut moves = Vec::new();

        for square in Square::iter() {
            let mask = masks[square];
            let (magic, table) = find_magic(square, mask, deltas, rng);

            entries[square] = MagicEntry {
                mask: mask.inner(),
                magic,
                shift: 64 - mask.population(),
                offset: moves.len(),
            };
            moves.extend(table);
        }

        (entries, moves)
    }
}

/// Randomly searches for a magic number for a slider at `square`, returning it along with the filled attack table.
///
/// # Panics
/// If no magic is found within [`MAX_MAGIC_TRIALS`] candidates.
fn find_magic(
    square: Square,
    mask: Bitboard,
    deltas: &[(i8, i8)],
    rng: &mut XoShiRo,
) -> (u64, Vec<Bitboard>) {
    let bits = mask.population();
    let shift = 64 - bits;

    // Every relevant occupancy, paired with the attacks it produces
    let occupancies = mask.subsets().collect::<Vec<_>>();
    let attacks = occupancies
        .iter()
        .map(|&occ| ray_attacks(square, occ, deltas))
        .collect::<Vec<_>>();

    let mut table: Vec<Option<Bitboard>> = vec![None; 1 << bits];

    for _ in 0..MAX_MAGIC_TRIALS {
        let magic = rng.next_sparse_u64();

        // Magics that don't spread the mask into the top byte are hopeless
        if (mask.inner().wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }

        table.iter_mut().for_each(|slot| *slot = None);

        let collision = occupancies.iter().zip(&attacks).any(|(occ, &atk)| {
            let index = (occ.inner().wrapping_mul(magic) >> shift) as usize;
            match table[index] {
                // Two occupancies may share a slot only if they produce the same attacks
                Some(existing) => existing != atk,
                None => {
                    table[index] = Some(atk);
                    false
                }
            }
        });

        if !collision {
            return (magic, table.into_iter().map(Option::unwrap_or_default).collect());
        }
    }

    panic!("Failed to find a magic number for {square} within {MAX_MAGIC_TRIALS} trials");
}

#[cfg(test)]
mod test {
    use super::*;

    /// Checks if `moves` and `legal_moves` contain all the same elements, ignoring order
    fn lists_match(moves: Bitboard, legal_moves: &[Square]) {
        assert_eq!(
            moves.population() as usize,
            legal_moves.len(),
            "\nMoves: {:?}\nLegal: {:?}",
            moves.iter().collect::<Vec<_>>(),
            legal_moves
        );

        for mv in moves {
            assert!(
                legal_moves.contains(&mv),
                "{} not found in {:?}",
                mv,
                legal_moves
            );
        }
    }

    #[test]
    fn rook_blockers() {
        let legal_moves = [
            Square::D2,
            Square::D3,
            Square::D5,
            Square::D6,
            Square::A4,
            Square::B4,
            Square::C4,
            Square::E4,
            Square::F4,
            Square::G4,
            Square::H4,
        ];

        let blockers = Square::D2.bitboard() | Square::D6 | Square::F2 | Square::H8 | Square::C3;

        lists_match(rook_attacks(Square::D4, blockers), &legal_moves);
    }

    #[test]
    fn test_magics_match_ray_casts_on_random_occupancies() {
        let mut rng = XoShiRo::from_seed(0xB0A4D);

        for square in Square::iter() {
            for _ in 0..200 {
                let occupancy = Bitboard::new(rng.next_u64() & rng.next_u64());

                assert_eq!(
                    rook_attacks(square, occupancy),
                    ray_attacks(square, occupancy, &ROOK_DELTAS),
                    "Rook attacks differ on {square} with occupancy\n{occupancy}"
                );
                assert_eq!(
                    bishop_attacks(square, occupancy),
                    ray_attacks(square, occupancy, &BISHOP_DELTAS),
                    "Bishop attacks differ on {square} with occupancy\n{occupancy}"
                );
            }
        }
    }

    #[test]
    fn test_magics_match_ray_casts_on_every_relevant_subset() {
        for square in [Square::A1, Square::D4, Square::H8, Square::E1, Square::B7] {
            for occupancy in rook_mask(square).subsets() {
                assert_eq!(
                    rook_attacks(square, occupancy),
                    ray_attacks(square, occupancy, &ROOK_DELTAS)
                );
            }
            for occupancy in bishop_mask(square).subsets() {
                assert_eq!(
                    bishop_attacks(square, occupancy),
                    ray_attacks(square, occupancy, &BISHOP_DELTAS)
                );
            }
        }
    }

    #[test]
    fn test_relevance_masks_exclude_edges() {
        assert_eq!(rook_mask(Square::A1).population(), 12);
        assert_eq!(rook_mask(Square::D4).population(), 10);
        assert_eq!(bishop_mask(Square::D4).population(), 9);
        assert_eq!(bishop_mask(Square::A1).population(), 6);
        assert!(!bishop_mask(Square::D4).intersects(Bitboard::EDGES));
    }

    #[test]
    fn test_leaper_tables() {
        assert_eq!(knight_attacks(Square::A1), Square::B3.bitboard() | Square::C2);
        assert_eq!(knight_attacks(Square::D4).population(), 8);
        assert_eq!(king_attacks(Square::H8).population(), 3);
        assert_eq!(king_attacks(Square::E4).population(), 8);
        assert_eq!(pawn_attacks(Square::A2, Color::White), Square::B3.bitboard());
        assert_eq!(pawn_attacks(Square::H7, Color::Black), Square::G6.bitboard());
        assert!(pawn_attacks(Square::E8, Color::White).is_empty());
    }

    #[test]
    fn test_queen_is_rook_and_bishop() {
        let occupancy = Square::C6.bitboard() | Square::F4 | Square::D2;
        assert_eq!(
            queen_attacks(Square::D4, occupancy),
            rook_attacks(Square::D4, occupancy) | bishop_attacks(Square::D4, occupancy)
        );
    }
}
