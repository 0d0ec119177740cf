//! Legal action enumeration.
//!
//! Actions are produced BOOM-first: a boom can end the game on the spot, so
//! the search wants to see those children before any move. Move enumeration
//! then walks every own stack, every detachable piece count, every direction,
//! and every step count allowed by the configured [`StepRule`].

use expendibots_core::{Action, Board, Direction, Side};

/// Which bound caps how far a move may travel.
///
/// The game rules exist in two readings: steps bounded by the stack's total
/// height regardless of how many pieces detach, or bounded by the detached
/// count itself. The bound is an explicit parameter so callers pick one
/// deliberately instead of inheriting a silent assumption.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum StepRule {
    /// Steps in `[1, n]` where `n` is the full height of the moving stack.
    #[default]
    StackHeight,
    /// Steps in `[1, k]` where `k` is the number of pieces detached.
    PiecesMoved,
}

/// Enumerates the legal actions for one side of a board.
pub struct ActionGenerator {
    step_rule: StepRule,
}

impl ActionGenerator {
    pub fn new(step_rule: StepRule) -> ActionGenerator {
        ActionGenerator { step_rule }
    }

    #[inline]
    pub fn step_rule(&self) -> StepRule {
        self.step_rule
    }

    /// All legal actions for `side`, booms first.
    ///
    /// Every `(from, pieces, direction, steps)` combination whose destination
    /// is on the board and not enemy-occupied is a distinct move; different
    /// combinations reaching the same square are not collapsed.
    pub fn legal_actions(&self, board: &Board, side: Side) -> Vec<Action> {
        let own = board.stacks(side);
        let enemy = board.stacks(side.opponent());

        let mut actions: Vec<Action> = own.keys().map(|&at| Action::Boom { at }).collect();

        for (&from, &height) in own {
            for pieces in 1..=height {
                let max_steps = match self.step_rule {
                    StepRule::StackHeight => height,
                    StepRule::PiecesMoved => pieces,
                };
                for direction in Direction::ALL {
                    for steps in 1..=max_steps {
                        let Some(dest) = from.offset(direction, steps) else {
                            break; // further steps leave the board too
                        };
                        if enemy.contains_key(&dest) {
                            continue; // may fly over, not land on, enemy stacks
                        }
                        actions.push(Action::Move {
                            from,
                            pieces,
                            direction,
                            steps,
                        });
                    }
                }
            }
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expendibots_core::Pos;

    fn board(white: &[(u8, u8, u8)], black: &[(u8, u8, u8)]) -> Board {
        Board::from_stacks(white, black).unwrap()
    }

    fn booms(actions: &[Action]) -> usize {
        actions
            .iter()
            .filter(|a| matches!(a, Action::Boom { .. }))
            .count()
    }

    #[test]
    fn test_lone_single_stack_center() {
        let b = board(&[(1, 4, 4)], &[]);
        let actions = ActionGenerator::new(StepRule::StackHeight).legal_actions(&b, Side::White);
        // 1 boom + 1 piece × 4 directions × 1 step.
        assert_eq!(booms(&actions), 1);
        assert_eq!(actions.len(), 5);
        assert_eq!(actions[0], Action::Boom { at: Pos::new(4, 4) });
    }

    #[test]
    fn test_step_rule_bounds() {
        // 2-stack in the corner: only Right and Up stay on the board.
        let b = board(&[(2, 0, 0)], &[]);
        let by_height = ActionGenerator::new(StepRule::StackHeight).legal_actions(&b, Side::White);
        // k in {1,2} × 2 directions × s in {1,2} = 8 moves, plus the boom.
        assert_eq!(by_height.len(), 9);

        let by_pieces = ActionGenerator::new(StepRule::PiecesMoved).legal_actions(&b, Side::White);
        // k=1 gives s=1 only (2 moves), k=2 gives s in {1,2} (4 moves).
        assert_eq!(by_pieces.len(), 7);
    }

    #[test]
    fn test_booms_come_first() {
        let b = board(&[(1, 0, 0), (2, 4, 4)], &[(1, 7, 7)]);
        let actions = ActionGenerator::new(StepRule::StackHeight).legal_actions(&b, Side::White);
        assert_eq!(booms(&actions), 2);
        assert!(matches!(actions[0], Action::Boom { .. }));
        assert!(matches!(actions[1], Action::Boom { .. }));
    }

    #[test]
    fn test_moves_may_fly_over_but_not_land_on_enemy() {
        // Enemy directly right of a 2-stack: landing one square right is
        // illegal, landing two squares right (over the enemy) is legal.
        let b = board(&[(2, 2, 2)], &[(1, 3, 2)]);
        let actions = ActionGenerator::new(StepRule::StackHeight).legal_actions(&b, Side::White);
        let blocked = Action::Move {
            from: Pos::new(2, 2),
            pieces: 1,
            direction: Direction::Right,
            steps: 1,
        };
        let over = Action::Move {
            from: Pos::new(2, 2),
            pieces: 1,
            direction: Direction::Right,
            steps: 2,
        };
        assert!(!actions.contains(&blocked));
        assert!(actions.contains(&over));
    }

    #[test]
    fn test_destinations_always_valid() {
        let b = board(&[(3, 0, 7), (1, 6, 6)], &[(2, 7, 7), (1, 5, 6)]);
        let actions = ActionGenerator::new(StepRule::StackHeight).legal_actions(&b, Side::White);
        for action in actions {
            // Every generated action must apply cleanly.
            assert!(b.apply(Side::White, action).is_ok(), "illegal action generated: {action}");
        }
    }

    #[test]
    fn test_no_actions_for_wiped_out_side() {
        let b = board(&[], &[(1, 0, 0)]);
        let actions = ActionGenerator::new(StepRule::StackHeight).legal_actions(&b, Side::White);
        assert!(actions.is_empty());
    }
}
