//! Board value objects.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RulesError;

/// A player's mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(&self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A square of the board, e.g. `b2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    file: u8,
    rank: u8,
}

impl Cell {
    pub const SIZE: u8 = 3;

    /// Creates a cell from zero-based file and rank, if both are on the board.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < Self::SIZE && rank < Self::SIZE).then_some(Self { file, rank })
    }

    /// Zero-based file (column), `a` = 0.
    pub fn file(&self) -> u8 {
        self.file
    }

    /// Zero-based rank (row), `1` = 0.
    pub fn rank(&self) -> u8 {
        self.rank
    }

    fn index(&self) -> usize {
        usize::from(self.rank) * usize::from(Self::SIZE) + usize::from(self.file)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", char::from(b'a' + self.file), self.rank + 1)
    }
}

impl FromStr for Cell {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 2 {
            return Err(RulesError::parse(s, "expected a cell like 'b2'"));
        }

        let file = bytes[0]
            .checked_sub(b'a')
            .filter(|f| *f < Cell::SIZE)
            .ok_or_else(|| RulesError::parse(s, "file must be a, b or c"))?;
        let rank = bytes[1]
            .checked_sub(b'1')
            .filter(|r| *r < Cell::SIZE)
            .ok_or_else(|| RulesError::parse(s, "rank must be 1, 2 or 3"))?;

        Ok(Cell { file, rank })
    }
}

const LINES: [[(u8, u8); 3]; 8] = [
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// A tic-tac-toe position, together with the moves that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    squares: [Option<Mark>; 9],
    moves: Vec<Cell>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cell: Cell) -> Option<Mark> {
        self.squares[cell.index()]
    }

    /// The player whose turn it is.
    pub fn to_move(&self) -> Mark {
        if self.moves.len() % 2 == 0 {
            Mark::X
        } else {
            Mark::O
        }
    }

    /// Cells played so far, in order.
    pub fn moves(&self) -> &[Cell] {
        &self.moves
    }

    pub fn is_full(&self) -> bool {
        self.squares.iter().all(Option::is_some)
    }

    /// The player holding a complete line, if any.
    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|line| {
            let marks: Vec<Option<Mark>> = line
                .iter()
                .map(|&(file, rank)| self.squares[usize::from(rank) * 3 + usize::from(file)])
                .collect();
            match marks.as_slice() {
                [Some(a), Some(b), Some(c)] if a == b && b == c => Some(*a),
                _ => None,
            }
        })
    }

    /// Places the mark of the player to move. The caller checks legality.
    pub(crate) fn place(&mut self, cell: Cell) {
        self.squares[cell.index()] = Some(self.to_move());
        self.moves.push(cell);
    }

    /// Grid rows from rank 3 down to rank 1.
    pub fn rows(&self) -> Vec<Vec<Option<Mark>>> {
        (0..Cell::SIZE)
            .rev()
            .map(|rank| {
                (0..Cell::SIZE)
                    .map(|file| self.squares[usize::from(rank) * 3 + usize::from(file)])
                    .collect()
            })
            .collect()
    }

    /// Renders the board as text, rank 3 on top.
    pub fn render(&self) -> String {
        let mut out = String::from("  a b c\n");
        for (i, row) in self.rows().iter().enumerate() {
            let rank = usize::from(Cell::SIZE) - i;
            let squares: Vec<String> = row
                .iter()
                .map(|square| square.map_or('.', |m| m.as_char()).to_string())
                .collect();
            out.push_str(&format!("{rank} {}\n", squares.join(" ")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Cell {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_displays_cells() {
        assert_eq!(cell("a1"), Cell::new(0, 0).unwrap());
        assert_eq!(cell(" C3 "), Cell::new(2, 2).unwrap());
        assert_eq!(cell("b2").to_string(), "b2");
    }

    #[test]
    fn rejects_malformed_cells() {
        for input in ["", "b", "d1", "a4", "a0", "b22", "11", "advance-piece-x"] {
            let err = input.parse::<Cell>().unwrap_err();
            assert!(matches!(err, RulesError::Parse { .. }), "{input}: {err}");
        }
    }

    #[test]
    fn cell_new_checks_bounds() {
        assert!(Cell::new(2, 2).is_some());
        assert!(Cell::new(3, 0).is_none());
        assert!(Cell::new(0, 3).is_none());
    }

    #[test]
    fn players_alternate() {
        let mut board = Board::new();
        assert_eq!(board.to_move(), Mark::X);
        board.place(cell("b2"));
        assert_eq!(board.to_move(), Mark::O);
        assert_eq!(board.get(cell("b2")), Some(Mark::X));
        assert_eq!(board.moves(), &[cell("b2")]);
        assert_eq!(Mark::X.opponent(), Mark::O);
    }

    #[test]
    fn detects_diagonal_winner() {
        let mut board = Board::new();
        for c in ["a1", "a2", "b2", "a3", "c3"] {
            board.place(cell(c));
        }
        assert_eq!(board.winner(), Some(Mark::X));
    }

    #[test]
    fn full_board_without_line() {
        let mut board = Board::new();
        for c in ["b2", "a1", "a3", "c1", "b1", "b3", "a2", "c2", "c3"] {
            board.place(cell(c));
        }
        assert!(board.is_full());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn renders_rank_three_on_top() {
        let mut board = Board::new();
        board.place(cell("a3"));
        board.place(cell("c1"));
        assert_eq!(board.render(), "  a b c\n3 X . .\n2 . . .\n1 . . O\n");
    }
}
