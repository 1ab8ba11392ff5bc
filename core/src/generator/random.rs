use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

/// Rejection-sampling budget, per board cell.
const PLACEMENT_ATTEMPTS_PER_CELL: u32 = 5;

/// Upper bound on carved holes, also capped at 8% of the board.
const MAX_HOLES: CellCount = 5;

/// Purely random placement, reproducible from its seed.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, params: &BoardParameters) -> Result<Board> {
        let ratio = params.validate()?;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut board = Board::new((params.rows, params.cols));
        let total_cells = board.total_cells();
        let mut attempts = u32::from(total_cells) * PLACEMENT_ATTEMPTS_PER_CELL;

        let holes = match params.pattern {
            Some(IrregularPattern::Holes) => carve_holes(&mut board, &mut rng, &mut attempts),
            None => 0,
        };
        let effective = total_cells - holes;
        let plan = params.plan(ratio, effective);

        // placement shares one retry budget, separate from carving
        attempts = u32::from(total_cells) * PLACEMENT_ATTEMPTS_PER_CELL;
        for (kind, wanted) in [
            (CellKind::Trap, plan.traps),
            (CellKind::Hazard, plan.hazards),
            (CellKind::Currency, plan.currency),
        ] {
            let placed = place(&mut board, kind, wanted, &mut rng, &mut attempts);
            if placed < wanted {
                log::warn!(
                    "Partial placement of {:?}, requested {} but placed {}",
                    kind,
                    wanted,
                    placed
                );
            }
        }

        board.recompute_clues();
        board.apply_overlays(Overlays::default());
        log::debug!(
            "Generated {}x{} board: {} hazards, {} currency, {} traps, {} holes",
            params.rows,
            params.cols,
            board.count_kind(CellKind::Hazard),
            board.count_kind(CellKind::Currency),
            board.count_kind(CellKind::Trap),
            holes
        );
        Ok(board)
    }
}

fn random_coords<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Coord2 {
    let (rows, cols) = board.size();
    (rng.random_range(0..rows), rng.random_range(0..cols))
}

fn carve_holes<R: Rng + ?Sized>(board: &mut Board, rng: &mut R, attempts: &mut u32) -> CellCount {
    let wanted = (u32::from(board.total_cells()) * 8 / 100).min(u32::from(MAX_HOLES)) as CellCount;
    let mut carved = 0;
    while carved < wanted && *attempts > 0 {
        *attempts -= 1;
        let coords = random_coords(board, rng);
        let cell = &mut board[coords];
        if cell.revealed {
            continue;
        }
        cell.revealed = true;
        cell.flags.insert(CellFlags::HOLE);
        carved += 1;
    }
    carved
}

fn place<R: Rng + ?Sized>(
    board: &mut Board,
    kind: CellKind,
    wanted: CellCount,
    rng: &mut R,
    attempts: &mut u32,
) -> CellCount {
    let mut placed = 0;
    while placed < wanted && *attempts > 0 {
        *attempts -= 1;
        let coords = random_coords(board, rng);
        let cell = &mut board[coords];
        if cell.revealed || cell.kind != CellKind::Empty {
            continue;
        }
        cell.kind = kind;
        placed += 1;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tally(board: &Board) -> CellCount {
        [
            CellKind::Hazard,
            CellKind::Currency,
            CellKind::Trap,
            CellKind::Clue,
        ]
        .into_iter()
        .map(|kind| board.count_kind(kind))
        .sum()
    }

    #[test]
    fn basic_board_has_expected_items() {
        let params = BoardParameters::new((8, 8), 15, "balanced", 0);

        let board = RandomBoardGenerator::new(7).generate(&params).unwrap();

        assert_eq!(board.count_kind(CellKind::Hazard), 7);
        assert_eq!(board.count_kind(CellKind::Currency), 2);
        assert_eq!(board.count_kind(CellKind::Trap), 0);
        assert_eq!(board.count_kind(CellKind::Clue), 55);
        assert_eq!(board.count_kind(CellKind::Empty), 0);
    }

    #[test]
    fn same_seed_same_board() {
        let params = BoardParameters::new((10, 12), 30, "hazardous", 3)
            .with_pattern(IrregularPattern::Holes);

        let a = RandomBoardGenerator::new(99).generate(&params).unwrap();
        let b = RandomBoardGenerator::new(99).generate(&params).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn holes_are_revealed_clues() {
        let params = BoardParameters::new((10, 10), 20, "balanced", 2)
            .with_pattern(IrregularPattern::Holes);

        let board = RandomBoardGenerator::new(3).generate(&params).unwrap();
        let holes: Vec<_> = board
            .iter_coords()
            .filter(|&coords| board[coords].is_hole())
            .collect();

        assert_eq!(holes.len(), 5);
        for coords in holes {
            assert!(board[coords].revealed);
            assert_eq!(board[coords].kind, CellKind::Clue);
        }
        // 95 effective cells at 20% floors to 19 items, split 14 + 4
        assert_eq!(
            board.count_kind(CellKind::Hazard) + board.count_kind(CellKind::Currency),
            14 + 4
        );
    }

    #[test]
    fn unknown_ratio_is_fatal() {
        let params = BoardParameters::new((8, 8), 15, "generous", 0);

        assert_eq!(
            RandomBoardGenerator::new(1).generate(&params),
            Err(GameError::UnknownRatio("generous".into()))
        );
    }

    #[test]
    fn oversized_trap_request_degrades() {
        let params = BoardParameters::new((2, 2), 50, "balanced", 9);

        let board = RandomBoardGenerator::new(5).generate(&params).unwrap();

        assert_eq!(board.count_kind(CellKind::Trap), 4);
        assert_eq!(tally(&board), 4);
    }

    proptest! {
        #[test]
        fn generated_boards_hold_invariants(
            seed in any::<u64>(),
            rows in 1u8..24,
            cols in 1u8..24,
            density in 0u8..=100,
            traps in 0u16..12,
            holes in any::<bool>(),
            ratio in prop::sample::select(vec!["balanced", "hazardous", "lucrative", "sparse"]),
        ) {
            let mut params = BoardParameters::new((rows, cols), density, ratio, traps);
            if holes {
                params = params.with_pattern(IrregularPattern::Holes);
            }

            let board = RandomBoardGenerator::new(seed).generate(&params).unwrap();

            prop_assert_eq!(tally(&board), mult(rows, cols));
            for coords in board.iter_coords() {
                let cell = board[coords];
                if cell.kind == CellKind::Clue {
                    let actual = board
                        .iter_neighbors(coords)
                        .filter(|&pos| board[pos].kind.is_counted())
                        .count();
                    prop_assert_eq!(usize::from(cell.counts.total), actual);
                }
            }
        }
    }
}
