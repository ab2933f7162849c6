//! Move counting across every variation of a game tree.

use crate::tree::GameTree;

/// Number of nodes, in all branches, that play a move (`B` or `W`).
///
/// The root is never counted, and setup properties (`AB`, `AW`, `AE`) are not moves.
pub fn count_moves(tree: &GameTree) -> usize {
    tree.nodes()
        .skip(1)
        .filter(|node| node.played_move().is_some())
        .count()
}
