//! Board representation and movement rules for the skirmish game.

use std::fmt;

use crate::{
    Result,
    canonical::{BoardSnapshot, PieceSnapshot},
    error::Error,
    ports::{ActionOutcome, CapturedPiece, RulesOracle},
    types::{ActionDescriptor, Seat, Square},
};

const ORTHOGONALS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONALS: [(i64, i64); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// The three piece kinds of the skirmish game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    /// Steps one square orthogonally. Worth 1.
    Scout,
    /// Slides any distance in a straight line, blocked by pieces. Worth 5.
    Rider,
    /// Steps one square in any direction. Worth 100; losing it loses the
    /// game.
    Monarch,
}

impl PieceKind {
    /// Capture reward for taking a piece of this kind.
    pub fn value(self) -> f64 {
        match self {
            PieceKind::Scout => 1.0,
            PieceKind::Rider => 5.0,
            PieceKind::Monarch => 100.0,
        }
    }

    /// Kind tag used in state strings.
    pub fn code(self) -> char {
        match self {
            PieceKind::Scout => 'S',
            PieceKind::Rider => 'R',
            PieceKind::Monarch => 'M',
        }
    }
}

/// A piece standing on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub owner: Seat,
}

impl Piece {
    pub fn new(kind: PieceKind, owner: Seat) -> Self {
        Self { kind, owner }
    }
}

/// An N by N grid of optionally occupied squares.
///
/// The board implements [`RulesOracle`], making it the reference
/// collaborator for driving agents end-to-end. Movement legality lives
/// entirely here; the learning core only sees snapshots and outcomes.
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Piece>>,
}

impl Board {
    pub const DEFAULT_SIZE: usize = 6;

    /// Create an empty board.
    pub fn empty(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// The standard starting position on the default 6 by 6 grid: each side
    /// fields a monarch, two riders and three scouts.
    pub fn standard() -> Self {
        Self::arrange(Self::DEFAULT_SIZE)
    }

    /// The starting arrangement scaled to an `size` by `size` board: riders
    /// in the back-rank corners, the monarch just off-center, three scouts
    /// screening it from the rank in front.
    pub fn starting(size: usize) -> Result<Self> {
        const MIN_SIZE: usize = 4;
        if size < MIN_SIZE {
            return Err(Error::BoardTooSmall {
                size,
                min: MIN_SIZE,
            });
        }
        Ok(Self::arrange(size))
    }

    fn arrange(size: usize) -> Self {
        let mut board = Self::empty(size);
        let last = size - 1;
        let mid = size / 2;

        let p1: [(PieceKind, usize, usize); 6] = [
            (PieceKind::Rider, 0, 0),
            (PieceKind::Monarch, mid - 1, 0),
            (PieceKind::Rider, last, 0),
            (PieceKind::Scout, mid - 2, 1),
            (PieceKind::Scout, mid - 1, 1),
            (PieceKind::Scout, mid, 1),
        ];
        let p2: [(PieceKind, usize, usize); 6] = [
            (PieceKind::Rider, 0, last),
            (PieceKind::Monarch, mid, last),
            (PieceKind::Rider, last, last),
            (PieceKind::Scout, mid - 1, last - 1),
            (PieceKind::Scout, mid, last - 1),
            (PieceKind::Scout, mid + 1, last - 1),
        ];
        for (kind, col, row) in p1 {
            let index = board.index(Square::new(col, row));
            board.cells[index] = Some(Piece::new(kind, Seat::P1));
        }
        for (kind, col, row) in p2 {
            let index = board.index(Square::new(col, row));
            board.cells[index] = Some(Piece::new(kind, Seat::P2));
        }

        board
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Put a piece on a square, replacing whatever stood there.
    pub fn place(&mut self, square: Square, piece: Piece) -> Result<()> {
        self.check_bounds(square)?;
        let index = self.index(square);
        self.cells[index] = Some(piece);
        Ok(())
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        if square.col >= self.size || square.row >= self.size {
            return None;
        }
        self.cells[self.index(square)].as_ref()
    }

    /// All occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, &Piece)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell.as_ref().map(|piece| (self.square_of(i), piece)))
    }

    /// Square of `seat`'s monarch, if it is still standing.
    pub fn monarch_square(&self, seat: Seat) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.kind == PieceKind::Monarch && p.owner == seat)
            .map(|(square, _)| square)
    }

    /// Whether any of `by`'s pieces can capture on `square`.
    pub fn is_attacked(&self, square: Square, by: Seat) -> bool {
        self.pieces()
            .filter(|(_, p)| p.owner == by)
            .any(|(origin, piece)| self.reach(origin, piece).1.contains(&square))
    }

    /// Non-capturing and capturing destinations of the piece on `square`.
    pub fn reachable(&self, square: Square) -> Result<(Vec<Square>, Vec<Square>)> {
        self.check_bounds(square)?;
        let piece = self
            .piece_at(square)
            .copied()
            .ok_or_else(|| Error::EmptySquare {
                square: square.to_string(),
            })?;
        Ok(self.reach(square, &piece))
    }

    fn index(&self, square: Square) -> usize {
        square.row * self.size + square.col
    }

    fn square_of(&self, index: usize) -> Square {
        Square::new(index % self.size, index / self.size)
    }

    fn check_bounds(&self, square: Square) -> Result<()> {
        if square.col >= self.size || square.row >= self.size {
            return Err(Error::InvalidSquare {
                col: square.col,
                row: square.row,
                size: self.size,
            });
        }
        Ok(())
    }

    fn offset(&self, square: Square, dc: i64, dr: i64) -> Option<Square> {
        let col = square.col as i64 + dc;
        let row = square.row as i64 + dr;
        if col < 0 || row < 0 || col >= self.size as i64 || row >= self.size as i64 {
            return None;
        }
        Some(Square::new(col as usize, row as usize))
    }

    fn reach(&self, origin: Square, piece: &Piece) -> (Vec<Square>, Vec<Square>) {
        let mut moves = Vec::new();
        let mut captures = Vec::new();

        match piece.kind {
            PieceKind::Scout => {
                self.collect_steps(origin, piece.owner, &ORTHOGONALS, &mut moves, &mut captures);
            }
            PieceKind::Monarch => {
                self.collect_steps(origin, piece.owner, &ORTHOGONALS, &mut moves, &mut captures);
                self.collect_steps(origin, piece.owner, &DIAGONALS, &mut moves, &mut captures);
            }
            PieceKind::Rider => {
                for direction in ORTHOGONALS.iter().chain(DIAGONALS.iter()) {
                    self.collect_slide(origin, piece.owner, *direction, &mut moves, &mut captures);
                }
            }
        }

        (moves, captures)
    }

    fn collect_steps(
        &self,
        origin: Square,
        owner: Seat,
        directions: &[(i64, i64)],
        moves: &mut Vec<Square>,
        captures: &mut Vec<Square>,
    ) {
        for &(dc, dr) in directions {
            let Some(target) = self.offset(origin, dc, dr) else {
                continue;
            };
            match self.piece_at(target) {
                None => moves.push(target),
                Some(other) if other.owner != owner => captures.push(target),
                Some(_) => {}
            }
        }
    }

    fn collect_slide(
        &self,
        origin: Square,
        owner: Seat,
        (dc, dr): (i64, i64),
        moves: &mut Vec<Square>,
        captures: &mut Vec<Square>,
    ) {
        let mut current = origin;
        while let Some(target) = self.offset(current, dc, dr) {
            match self.piece_at(target) {
                None => {
                    moves.push(target);
                    current = target;
                }
                Some(other) if other.owner != owner => {
                    captures.push(target);
                    break;
                }
                Some(_) => break,
            }
        }
    }

    fn force_move(&mut self, from: Square, to: Square) {
        let from_index = self.index(from);
        let to_index = self.index(to);
        self.cells[to_index] = self.cells[from_index].take();
    }
}

impl RulesOracle for Board {
    fn snapshot(&self, seat: Seat) -> BoardSnapshot {
        let pieces = self
            .pieces()
            .map(|(square, piece)| {
                let mut snapshot = PieceSnapshot::new(piece.kind.code(), piece.owner, square);
                if piece.owner == seat {
                    let (moves, captures) = self.reach(square, piece);
                    snapshot = snapshot.with_moves(moves).with_captures(captures);
                }
                snapshot
            })
            .collect();

        BoardSnapshot::new(seat, pieces)
    }

    fn apply(&mut self, seat: Seat, action: &ActionDescriptor) -> Result<ActionOutcome> {
        self.check_bounds(action.from)?;
        self.check_bounds(action.to)?;

        let piece = self
            .piece_at(action.from)
            .copied()
            .ok_or_else(|| Error::EmptySquare {
                square: action.from.to_string(),
            })?;
        if piece.owner != seat {
            return Err(Error::WrongOwner {
                square: action.from.to_string(),
            });
        }

        let (moves, captures) = self.reach(action.from, &piece);
        let is_capture = captures.contains(&action.to);
        if !is_capture && !moves.contains(&action.to) {
            return Err(Error::UnreachableSquare {
                origin: action.from.to_string(),
                square: action.to.to_string(),
            });
        }

        // Refuse any move that would leave the mover's monarch attackable;
        // the board must stay untouched on this path.
        let mut scratch = self.clone();
        scratch.force_move(action.from, action.to);
        if let Some(monarch) = scratch.monarch_square(seat)
            && scratch.is_attacked(monarch, seat.opponent())
        {
            return Ok(ActionOutcome::exposed());
        }

        let captured = self.piece_at(action.to).map(|target| CapturedPiece {
            kind: target.kind.code(),
            value: target.kind.value(),
            square: action.to,
            decisive: target.kind == PieceKind::Monarch,
        });
        self.force_move(action.from, action.to);

        Ok(match captured {
            Some(piece) => ActionOutcome::captured(piece),
            None => ActionOutcome::applied(),
        })
    }

    fn is_terminal(&self, seat: Seat) -> bool {
        !self
            .pieces()
            .filter(|(_, p)| p.owner == seat)
            .any(|(square, piece)| {
                let (moves, captures) = self.reach(square, piece);
                !moves.is_empty() || !captures.is_empty()
            })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.size).rev() {
            for col in 0..self.size {
                let glyph = match self.piece_at(Square::new(col, row)) {
                    Some(piece) if piece.owner == Seat::P1 => piece.kind.code(),
                    Some(piece) => piece.kind.code().to_ascii_lowercase(),
                    None => '.',
                };
                write!(f, "{glyph} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
