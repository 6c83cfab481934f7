//! Two-row mancala: six pits of four tokens per player and one store each.
//!
//! Sowing runs counter-clockwise through the mover's pits, the mover's store and the opponent's
//! pits, skipping the opponent's store. Ending a turn in an empty own pit captures that token
//! and everything in the pit opposite. The game ends as soon as either row is empty.
//!
//! With double moves enabled, finishing a sow in the own store hands the opponent a single
//! [`MancalaMove::Pass`], so plies still alternate between the players.

use crate::tree::{Game, GameNode, Node, NodeAim, NodeKind};

pub const PITS: usize = 6;
const TOKENS: u8 = 4;
const STORE: usize = PITS;
const LAP: usize = 2 * PITS + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MancalaMove {
    Sow(usize),
    Pass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pits: [[u8; PITS]; 2],
    stores: [u8; 2],
    active_player: usize,
    moves: Vec<MancalaMove>,
    finished: bool,
    double_move: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Board {
    pub fn new(double_move: bool) -> Self {
        let mut board = Self {
            pits: [[TOKENS; PITS]; 2],
            stores: [0, 0],
            active_player: 0,
            moves: Vec::new(),
            finished: false,
            double_move,
        };
        board.generate_moves();
        board
    }

    pub fn active_player(&self) -> usize {
        self.active_player
    }

    pub fn pits(&self, player: usize) -> &[u8; PITS] {
        &self.pits[player]
    }

    pub fn stores(&self) -> [u8; 2] {
        self.stores
    }

    pub fn moves(&self) -> &[MancalaMove] {
        &self.moves
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Store difference from player 0's point of view.
    pub fn score(&self) -> f64 {
        f64::from(self.stores[0]) - f64::from(self.stores[1])
    }

    fn generate_moves(&mut self) {
        self.moves = self.pits[self.active_player]
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(pit, _)| MancalaMove::Sow(pit))
            .collect();
    }

    pub fn play(&mut self, game_move: MancalaMove) {
        let start = match game_move {
            MancalaMove::Pass => {
                self.active_player ^= 1;
                self.generate_moves();
                return;
            }
            MancalaMove::Sow(pit) => pit,
        };
        let player = self.active_player;
        let opponent = player ^ 1;

        let mut tokens = self.pits[player][start];
        self.pits[player][start] = 0;
        let mut position = start;
        while tokens > 0 {
            position = (position + 1) % LAP;
            match position {
                p if p < PITS => self.pits[player][p] += 1,
                STORE => self.stores[player] += 1,
                p if p == LAP - 1 => continue,
                p => self.pits[opponent][p - STORE - 1] += 1,
            }
            tokens -= 1;
        }

        if position < PITS && self.pits[player][position] == 1 {
            let opposite = PITS - 1 - position;
            let captured = self.pits[opponent][opposite];
            if captured > 0 {
                self.pits[opponent][opposite] = 0;
                self.pits[player][position] = 0;
                self.stores[player] += captured + 1;
            }
        }

        if self.pits.iter().any(|row| row.iter().all(|&count| count == 0)) {
            self.finished = true;
            self.moves.clear();
            return;
        }

        self.active_player = opponent;
        if self.double_move && position == STORE {
            self.moves = vec![MancalaMove::Pass];
        } else {
            self.generate_moves();
        }
    }
}

/// Player 0 maximizes the store difference, player 1 minimizes it.
///
/// Children carry their value and their moves, so the tree never calls back for either.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mancala;

impl Mancala {
    pub fn root(board: Board) -> GameNode<Self> {
        let aim = aim_for(board.active_player());
        let moves = board.moves().to_vec();
        let value = board.score();
        Node::root(board, MancalaMove::Pass, (), aim)
            .with_moves(moves)
            .with_value(value)
    }
}

fn aim_for(player: usize) -> NodeAim {
    if player == 0 {
        NodeAim::Max
    } else {
        NodeAim::Min
    }
}

impl Game for Mancala {
    type State = Board;
    type Move = MancalaMove;
    type Data = ();

    fn get_moves(&self, node: &GameNode<Self>) -> Vec<MancalaMove> {
        node.state.moves().to_vec()
    }

    fn create_child(&self, parent: &GameNode<Self>, game_move: &MancalaMove) -> GameNode<Self> {
        let mut board = parent.state.clone();
        board.play(*game_move);
        let kind = if board.is_finished() {
            NodeKind::Leaf
        } else {
            NodeKind::Inner
        };
        let aim = aim_for(board.active_player());
        let moves = board.moves().to_vec();
        let value = board.score();
        Node::new(kind, board, *game_move, ())
            .with_aim(aim)
            .with_moves(moves)
            .with_value(value)
    }
}
