//! State desirability for the searching side. Lower orders first.

use expendibots_core::{Board, Side};

/// Heuristic score. The derived order is the search order: `Win` before
/// every ongoing state, `Loss` after every ongoing state, ongoing states by
/// remaining enemy pieces and then by the distance tie-break.
///
/// The tie-break lives in its own field rather than being folded into one
/// number, so it can never reorder states with different enemy totals.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Score {
    /// No enemy pieces remain.
    Win,
    /// `enemy` pieces left to destroy; `spread_milli` is the mean Manhattan
    /// distance between own and enemy stacks, in thousandths of a square.
    Ongoing { enemy: u32, spread_milli: u32 },
    /// Own side wiped out while enemies remain. Nothing reachable from here.
    Loss,
}

/// Score a state for `side`.
pub fn score(board: &Board, side: Side) -> Score {
    let enemy = board.total(side.opponent());
    if enemy == 0 {
        return Score::Win;
    }
    if board.total(side) == 0 {
        return Score::Loss;
    }
    Score::Ongoing {
        enemy,
        spread_milli: mean_distance_milli(board, side),
    }
}

/// Mean Manhattan distance over all own-stack × enemy-stack pairs, ×1000.
///
/// Both maps are non-empty here (the terminal cases return early), so the
/// pair count is never zero. Max value is 14 000 (two lone corner stacks).
fn mean_distance_milli(board: &Board, side: Side) -> u32 {
    let own = board.stacks(side);
    let enemy = board.stacks(side.opponent());
    let mut sum: u32 = 0;
    for a in own.keys() {
        for b in enemy.keys() {
            sum += (a.x.abs_diff(b.x) + a.y.abs_diff(b.y)) as u32;
        }
    }
    sum * 1000 / (own.len() as u32 * enemy.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(white: &[(u8, u8, u8)], black: &[(u8, u8, u8)]) -> Board {
        Board::from_stacks(white, black).unwrap()
    }

    #[test]
    fn test_win_iff_no_enemy() {
        assert_eq!(score(&board(&[(2, 0, 0)], &[]), Side::White), Score::Win);
        // Both sides gone still counts as a win for the searcher.
        assert_eq!(score(&board(&[], &[]), Side::White), Score::Win);
        assert_ne!(score(&board(&[(1, 0, 0)], &[(1, 5, 5)]), Side::White), Score::Win);
    }

    #[test]
    fn test_loss_iff_own_wiped_with_enemy_left() {
        assert_eq!(score(&board(&[], &[(1, 5, 5)]), Side::White), Score::Loss);
        assert_eq!(score(&board(&[(1, 5, 5)], &[]), Side::Black), Score::Loss);
    }

    #[test]
    fn test_ongoing_counts_enemy_pieces() {
        let s = score(&board(&[(1, 0, 0)], &[(2, 0, 1), (1, 7, 7)]), Side::White);
        match s {
            Score::Ongoing { enemy, .. } => assert_eq!(enemy, 3),
            other => panic!("expected ongoing score, got {other:?}"),
        }
    }

    #[test]
    fn test_spread_rewards_proximity() {
        let far = score(&board(&[(1, 0, 0)], &[(1, 7, 7)]), Side::White);
        let near = score(&board(&[(1, 6, 6)], &[(1, 7, 7)]), Side::White);
        assert!(near < far);
    }

    #[test]
    fn test_spread_never_beats_enemy_count() {
        // One enemy piece far away still orders before two adjacent ones.
        let one_far = score(&board(&[(1, 0, 0)], &[(1, 7, 7)]), Side::White);
        let two_near = score(&board(&[(1, 0, 0)], &[(2, 1, 1)]), Side::White);
        assert!(one_far < two_near);
    }

    #[test]
    fn test_total_order_win_ongoing_loss() {
        let win = Score::Win;
        let ongoing = Score::Ongoing { enemy: 1, spread_milli: 14_000 };
        let loss = Score::Loss;
        assert!(win < ongoing);
        assert!(ongoing < loss);
    }

    #[test]
    fn test_mean_distance_exact() {
        // Own (0,0); enemies (3,4) and (1,1): distances 7 and 2, mean 4.5.
        let b = board(&[(1, 0, 0)], &[(1, 3, 4), (2, 1, 1)]);
        match score(&b, Side::White) {
            Score::Ongoing { spread_milli, .. } => assert_eq!(spread_milli, 4_500),
            other => panic!("expected ongoing score, got {other:?}"),
        }
    }
}
