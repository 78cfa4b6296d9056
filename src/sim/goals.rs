//! Win condition

use super::state::Board;

/// True when every goal has a cube on it showing the required colour on top.
///
/// A board with no goals counts as satisfied.
pub fn is_satisfied(board: &Board) -> bool {
    board.goals().iter().all(|g| {
        board
            .cubes()
            .iter()
            .any(|c| c.pos == g.pos && c.orientation.top() == &g.required_top)
    })
}
