/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{
    pawn_attacks, Bitboard, CastlingRights, Color, Move, MoveList, Piece, PieceKind, Position,
    Rank, Square,
};

/// Everything needed to check and emit one castling move.
struct CastleRule {
    right: CastlingRights,
    king_from: Square,
    king_to: Square,
    rook_from: Square,

    /// Squares between King and Rook, which must be empty.
    between: Bitboard,

    /// Squares the King stands on, passes through, and lands on, which must not be attacked.
    path: [Square; 3],
}

const CASTLE_RULES: [[CastleRule; 2]; Color::COUNT] = [
    [
        CastleRule {
            right: CastlingRights::WHITE_KINGSIDE,
            king_from: Square::E1,
            king_to: Square::G1,
            rook_from: Square::H1,
            between: Square::F1.bitboard().or(Square::G1.bitboard()),
            path: [Square::E1, Square::F1, Square::G1],
        },
        CastleRule {
            right: CastlingRights::WHITE_QUEENSIDE,
            king_from: Square::E1,
            king_to: Square::C1,
            rook_from: Square::A1,
            between: Square::B1
                .bitboard()
                .or(Square::C1.bitboard())
                .or(Square::D1.bitboard()),
            path: [Square::E1, Square::D1, Square::C1],
        },
    ],
    [
        CastleRule {
            right: CastlingRights::BLACK_KINGSIDE,
            king_from: Square::E8,
            king_to: Square::G8,
            rook_from: Square::H8,
            between: Square::F8.bitboard().or(Square::G8.bitboard()),
            path: [Square::E8, Square::F8, Square::G8],
        },
        CastleRule {
            right: CastlingRights::BLACK_QUEENSIDE,
            king_from: Square::E8,
            king_to: Square::C8,
            rook_from: Square::A8,
            between: Square::B8
                .bitboard()
                .or(Square::C8.bitboard())
                .or(Square::D8.bitboard()),
            path: [Square::E8, Square::D8, Square::C8],
        },
    ],
];

impl Position {
    /// Generates every pseudo-legal move for the side to move.
    ///
    /// Moves may leave the mover's own King in check; [`Position::make_move`] reports those as illegal.
    /// Castling is the exception: it is only generated when fully legal.
    ///
    /// The order is deterministic: pawn moves, then piece moves from Knight to King, then castling.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// assert_eq!(Position::default().pseudo_legal_moves().len(), 20);
    /// ```
    pub fn pseudo_legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();

        self.generate_pawn_moves(&mut moves);
        self.generate_piece_moves(&mut moves);
        self.generate_castling_moves(&mut moves);

        moves
    }

    fn generate_pawn_moves(&self, moves: &mut MoveList) {
        let us = self.side_to_move();
        let them = us.opponent();
        let pawn = Piece::new(us, PieceKind::Pawn);
        let enemies = self.color(them);

        let (start_rank, promotion_rank) = match us {
            Color::White => (Rank::TWO, Rank::EIGHT),
            Color::Black => (Rank::SEVEN, Rank::ONE),
        };

        for from in self.piece_bb(pawn) {
            // Pushes
            if let Some(one) = from.offset(0, us.forward()) {
                if !self.is_occupied(one) {
                    if one.rank() == promotion_rank {
                        push_promotions(moves, from, one, pawn, None);
                    } else {
                        moves.push(Move::quiet(from, one, pawn));

                        if from.rank() == start_rank {
                            if let Some(two) = one.offset(0, us.forward()) {
                                if !self.is_occupied(two) {
                                    moves.push(Move::new(
                                        from, two, pawn, None, None, true, false, false,
                                    ));
                                }
                            }
                        }
                    }
                }
            }

            // Captures
            let attacks = pawn_attacks(from, us);
            for to in attacks & enemies {
                let victim = self.piece_at(to);
                if to.rank() == promotion_rank {
                    push_promotions(moves, from, to, pawn, victim);
                } else {
                    moves.push(Move::new(from, to, pawn, victim, None, false, false, false));
                }
            }

            // The passed pawn stands beside us, and the target behind it must be empty
            if let Some(ep) = self.ep_square() {
                let victim = Piece::new(them, PieceKind::Pawn);
                if attacks.get(ep)
                    && !self.is_occupied(ep)
                    && self.piece_at(Square::new(ep.file(), from.rank())) == Some(victim)
                {
                    moves.push(Move::new(from, ep, pawn, Some(victim), None, false, true, false));
                }
            }
        }
    }

    fn generate_piece_moves(&self, moves: &mut MoveList) {
        let us = self.side_to_move();
        let occupancy = self.occupied();
        let not_ours = !self.color(us);

        for kind in &PieceKind::all()[1..] {
            let piece = Piece::new(us, *kind);

            for from in self.piece_bb(piece) {
                for to in piece.attacks(from, occupancy) & not_ours {
                    let victim = self.piece_at(to);
                    moves.push(Move::new(from, to, piece, victim, None, false, false, false));
                }
            }
        }
    }

    fn generate_castling_moves(&self, moves: &mut MoveList) {
        let us = self.side_to_move();
        let them = us.opponent();
        let king = Piece::new(us, PieceKind::King);
        let rook = Piece::new(us, PieceKind::Rook);

        for rule in &CASTLE_RULES[us] {
            if !self.castling_rights().has(rule.right)
                || self.occupied().intersects(rule.between)
                || !self.piece_bb(king).get(rule.king_from)
                || !self.piece_bb(rook).get(rule.rook_from)
            {
                continue;
            }

            if rule
                .path
                .iter()
                .any(|&square| self.is_square_attacked(square, them))
            {
                continue;
            }

            moves.push(Move::new(
                rule.king_from,
                rule.king_to,
                king,
                None,
                None,
                false,
                false,
                true,
            ));
        }
    }
}

/// Pushes one move per promotion target, Knight first.
fn push_promotions(
    moves: &mut MoveList,
    from: Square,
    to: Square,
    pawn: Piece,
    victim: Option<Piece>,
) {
    for kind in PieceKind::promotions() {
        moves.push(Move::new(
            from,
            to,
            pawn,
            victim,
            Some(pawn.promoted(kind)),
            false,
            false,
            false,
        ));
    }
}
