/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use newt::{parallel_perft, perft, perft_generic, Position, FEN_KIWIPETE, FEN_STARTPOS};

fn test_perft_fen_nodes(depth: usize, fen: &str, expected: u64) {
    let position = Position::from_fen(fen).unwrap();
    let res = perft_generic::<false, false>(&position, depth);
    assert_eq!(res, expected, "PERFT({depth}) failed on {fen}");
}

/// https://www.chessprogramming.org/Perft_Results
#[cfg(test)]
mod startpos_perft {
    use super::*;

    #[test]
    fn test_startpos_perft_1() {
        test_perft_fen_nodes(1, FEN_STARTPOS, 20);
    }

    #[test]
    fn test_startpos_perft_2() {
        test_perft_fen_nodes(2, FEN_STARTPOS, 400);
    }

    #[test]
    fn test_startpos_perft_3() {
        test_perft_fen_nodes(3, FEN_STARTPOS, 8_902);
    }

    #[test]
    fn test_startpos_perft_4() {
        test_perft_fen_nodes(4, FEN_STARTPOS, 197_281);
    }

    #[test]
    fn test_startpos_perft_5() {
        test_perft_fen_nodes(5, FEN_STARTPOS, 4_865_609);
    }
}

/// https://www.chessprogramming.org/Perft_Results
#[cfg(test)]
mod kiwipete_perft {
    use super::*;

    #[test]
    fn test_kiwipete_perft_1() {
        test_perft_fen_nodes(1, FEN_KIWIPETE, 48);
    }

    #[test]
    fn test_kiwipete_perft_2() {
        test_perft_fen_nodes(2, FEN_KIWIPETE, 2_039);
    }

    #[test]
    fn test_kiwipete_perft_3() {
        test_perft_fen_nodes(3, FEN_KIWIPETE, 97_862);
    }

    #[test]
    fn test_kiwipete_perft_4() {
        test_perft_fen_nodes(4, FEN_KIWIPETE, 4_085_603);
    }
}

/// https://www.chessprogramming.org/Perft_Results
#[cfg(test)]
mod numbered_perfts {
    use super::*;

    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_4_MIRRORED: &str =
        "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
    const POSITION_6: &str =
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";

    #[test]
    fn test_position_3() {
        test_perft_fen_nodes(1, POSITION_3, 14);
        test_perft_fen_nodes(2, POSITION_3, 191);
        test_perft_fen_nodes(3, POSITION_3, 2_812);
        test_perft_fen_nodes(4, POSITION_3, 43_238);
        test_perft_fen_nodes(5, POSITION_3, 674_624);
    }

    #[test]
    fn test_position_4() {
        test_perft_fen_nodes(1, POSITION_4, 6);
        test_perft_fen_nodes(2, POSITION_4, 264);
        test_perft_fen_nodes(3, POSITION_4, 9_467);
        test_perft_fen_nodes(4, POSITION_4, 422_333);
    }

    #[test]
    fn test_position_4_mirrored() {
        test_perft_fen_nodes(1, POSITION_4_MIRRORED, 6);
        test_perft_fen_nodes(2, POSITION_4_MIRRORED, 264);
        test_perft_fen_nodes(3, POSITION_4_MIRRORED, 9_467);
        test_perft_fen_nodes(4, POSITION_4_MIRRORED, 422_333);
    }

    #[test]
    fn test_position_5() {
        test_perft_fen_nodes(1, POSITION_5, 44);
        test_perft_fen_nodes(2, POSITION_5, 1_486);
        test_perft_fen_nodes(3, POSITION_5, 62_379);
        test_perft_fen_nodes(4, POSITION_5, 2_103_487);
    }

    #[test]
    fn test_position_6() {
        test_perft_fen_nodes(1, POSITION_6, 46);
        test_perft_fen_nodes(2, POSITION_6, 2_079);
        test_perft_fen_nodes(3, POSITION_6, 89_890);
        test_perft_fen_nodes(4, POSITION_6, 3_894_594);
    }
}

#[cfg(test)]
mod promotion_perft {
    use crate::test_perft_fen_nodes;

    const FEN: &str = "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1 ";

    #[test]
    fn test_promotion_perft_1() {
        test_perft_fen_nodes(1, FEN, 24);
    }

    #[test]
    fn test_promotion_perft_2() {
        test_perft_fen_nodes(2, FEN, 496);
    }

    #[test]
    fn test_promotion_perft_3() {
        test_perft_fen_nodes(3, FEN, 9_483);
    }

    #[test]
    fn test_promotion_perft_4() {
        test_perft_fen_nodes(4, FEN, 182_838);
    }
}

/// https://www.chessprogramming.net/perfect-perft/
#[cfg(test)]
mod special_perfts {
    use super::*;

    #[test]
    fn test_special_perft_illegal_ep_move_1() {
        test_perft_fen_nodes(6, "3k4/3p4/8/K1P4r/8/8/8/8 b - - 0 1", 1_134_888);
    }

    #[test]
    fn test_special_perft_illegal_ep_move_2() {
        test_perft_fen_nodes(6, "8/8/4k3/8/2p5/8/B2P2K1/8 w - - 0 1", 1_015_133);
    }

    #[test]
    fn test_special_perft_ep_capture_checks_opponent() {
        test_perft_fen_nodes(6, "8/8/1k6/2b5/2pP4/8/5K2/8 b - d3 0 1", 1_440_467);
    }

    #[test]
    fn test_special_perft_short_castling_gives_check() {
        test_perft_fen_nodes(6, "5k2/8/8/8/8/8/8/4K2R w K - 0 1", 661_072);
    }

    #[test]
    fn test_special_perft_long_castling_gives_check() {
        test_perft_fen_nodes(6, "3k4/8/8/8/8/8/8/R3K3 w Q - 0 1", 803_711);
    }

    #[test]
    fn test_special_perft_castle_rights() {
        test_perft_fen_nodes(
            4,
            "r3k2r/1b4bq/8/8/8/8/7B/R3K2R w KQkq - 0 1",
            1_274_206,
        );
    }

    #[test]
    fn test_special_perft_castling_prevented() {
        test_perft_fen_nodes(
            4,
            "r3k2r/8/3Q4/8/8/5q2/8/R3K2R b KQkq - 0 1",
            1_720_476,
        );
    }

    #[test]
    fn test_special_perft_promote_out_of_check() {
        test_perft_fen_nodes(6, "2K2r2/4P3/8/8/8/8/8/3k4 w - - 0 1", 3_821_001);
    }

    #[test]
    fn test_special_perft_discovered_check() {
        test_perft_fen_nodes(5, "8/8/1P2K3/8/2n5/1q6/8/5k2 b - - 0 1", 1_004_658);
    }

    #[test]
    fn test_special_perft_promote_to_give_check() {
        test_perft_fen_nodes(6, "4k3/1P6/8/8/8/8/K7/8 w - - 0 1", 217_342);
    }

    #[test]
    fn test_special_perft_under_promote_to_give_check() {
        test_perft_fen_nodes(6, "8/P1k5/K7/8/8/8/8/8 w - - 0 1", 92_683);
    }

    #[test]
    fn test_special_perft_self_stalemate() {
        test_perft_fen_nodes(6, "K1k5/8/P7/8/8/8/8/8 w - - 0 1", 2_217);
    }

    #[test]
    fn test_special_perft_stalemate_and_checkmate_1() {
        test_perft_fen_nodes(7, "8/k1P5/8/1K6/8/8/8/8 w - - 0 1", 567_584);
    }

    #[test]
    fn test_special_perft_stalemate_and_checkmate_2() {
        test_perft_fen_nodes(4, "8/8/2k5/5q2/5n2/8/5K2/8 b - - 0 1", 23_527);
    }
}

#[cfg(test)]
mod parallel_perfts {
    use super::*;

    #[test]
    fn test_parallel_perft_matches_serial() {
        for fen in [FEN_STARTPOS, FEN_KIWIPETE, "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -"] {
            let position = Position::from_fen(fen).unwrap();
            let serial = perft(&position, 4);

            for threads in [2, 4, 16] {
                assert_eq!(
                    parallel_perft(&position, 4, threads),
                    serial,
                    "parallel perft with {threads} threads disagreed on {fen}"
                );
            }
        }
    }

    #[test]
    fn test_bulk_counting_matches_full_counting() {
        let position = Position::from_fen(FEN_KIWIPETE).unwrap();
        assert_eq!(perft(&position, 3), perft_generic::<false, false>(&position, 3));
    }
}
