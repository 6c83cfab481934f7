//! Noughts and crosses on a 3x3 board. Circle moves first.

use std::fmt;

use crate::error::SearchError;
use crate::tree::{Game, GameNode, Node, NodeAim, NodeKind};

/// Move stored on the root, which was not reached by playing a cell.
pub const ROOT_MOVE: usize = usize::MAX;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Circle,
    Cross,
}

impl Cell {
    fn other(self) -> Self {
        match self {
            Cell::Circle => Cell::Cross,
            Cell::Cross => Cell::Circle,
            Cell::Empty => Cell::Empty,
        }
    }
}

/// Board cells are indexed 0..9 in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; 9],
    turn: Cell,
    winner: Option<Cell>,
    finished: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
            turn: Cell::Circle,
            winner: None,
            finished: false,
        }
    }

    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    /// Mark of the player to move.
    pub fn turn(&self) -> Cell {
        self.turn
    }

    pub fn winner(&self) -> Option<Cell> {
        self.winner
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Empty cells in row-major order, or nothing once the game is over.
    pub fn available_moves(&self) -> Vec<usize> {
        if self.finished {
            return Vec::new();
        }
        (0..9).filter(|&i| self.cells[i] == Cell::Empty).collect()
    }

    /// Puts the mark of the player to move on `index` and passes the turn.
    pub fn play(&mut self, index: usize) {
        let mark = self.turn;
        self.place(index, mark);
        self.turn = mark.other();
    }

    /// Puts `mark` on `index` without passing the turn.
    pub fn place(&mut self, index: usize, mark: Cell) {
        self.cells[index] = mark;
        let won = LINES
            .iter()
            .filter(|line| line.contains(&index))
            .any(|line| line.iter().all(|&i| self.cells[i] == mark));
        if won {
            self.winner = Some(mark);
            self.finished = true;
        } else if self.cells.iter().all(|&c| c != Cell::Empty) {
            self.finished = true;
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.cells.chunks(3) {
            for cell in row {
                let c = match cell {
                    Cell::Empty => '.',
                    Cell::Circle => 'o',
                    Cell::Cross => 'x',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Circle is the maximizing player: a circle win is worth 1, a cross win -1 and a draw 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl TicTacToe {
    pub fn root(board: Board) -> GameNode<Self> {
        let aim = match board.turn() {
            Cell::Cross => NodeAim::Min,
            _ => NodeAim::Max,
        };
        Node::root(board, ROOT_MOVE, (), aim)
    }
}

impl Game for TicTacToe {
    type State = Board;
    type Move = usize;
    type Data = ();

    fn get_moves(&self, node: &GameNode<Self>) -> Vec<usize> {
        node.state.available_moves()
    }

    fn create_child(&self, parent: &GameNode<Self>, game_move: &usize) -> GameNode<Self> {
        let mut board = parent.state.clone();
        board.play(*game_move);
        let kind = if board.is_finished() {
            NodeKind::Leaf
        } else {
            NodeKind::Inner
        };
        Node::new(kind, board, *game_move, ()).with_aim(parent.aim.opposite())
    }

    fn evaluate(&self, node: &GameNode<Self>) -> Result<f64, SearchError> {
        Ok(match node.state.winner() {
            Some(Cell::Circle) => 1.0,
            Some(Cell::Cross) => -1.0,
            _ => 0.0,
        })
    }
}
