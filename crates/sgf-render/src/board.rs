//! Board state rebuilt from a game record's main line.

use sgf_core::tree::{GameNode, GameTree, Stone, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Stone>>,
    /// 1-based number of the move that put the current stone on each point.
    numbers: Vec<Option<usize>>,
    last_move: Option<Point>,
    moves_played: usize,
    /// Prisoners taken by black and by white.
    captures: [usize; 2],
    /// Flood-fill visit marks; a point is visited when its mark equals `stamp`.
    marks: Vec<u32>,
    stamp: u32,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
            numbers: vec![None; size * size],
            last_move: None,
            moves_played: 0,
            captures: [0, 0],
            marks: vec![0; size * size],
            stamp: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, p: Point) -> Option<Stone> {
        self.cells[self.offset(p)]
    }

    pub fn number_at(&self, p: Point) -> Option<usize> {
        self.numbers[self.offset(p)]
    }

    pub fn last_move(&self) -> Option<Point> {
        self.last_move
    }

    pub fn moves_played(&self) -> usize {
        self.moves_played
    }

    pub fn captures_by(&self, stone: Stone) -> usize {
        self.captures[colour_slot(stone)]
    }

    /// Every occupied point with its stone.
    pub fn stones(&self) -> impl Iterator<Item = (Point, Stone)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, cell)| {
            cell.map(|stone| {
                (
                    Point {
                        x: i % self.size,
                        y: i / self.size,
                    },
                    stone,
                )
            })
        })
    }

    /// Setup placement (`AB`, `AW`, `AE`). Not a move and never captures.
    pub fn set(&mut self, p: Point, stone: Option<Stone>) {
        let at = self.offset(p);
        self.cells[at] = stone;
        self.numbers[at] = None;
    }

    /// Play a move and resolve captures. Returns the number of stones removed.
    ///
    /// Playing onto an occupied point replaces the stone; records are not
    /// checked for legality.
    pub fn play(&mut self, stone: Stone, p: Point) -> usize {
        self.moves_played += 1;
        let at = self.offset(p);
        self.cells[at] = Some(stone);
        self.numbers[at] = Some(self.moves_played);
        self.last_move = Some(p);

        let mut removed = 0;
        for n in self.neighbours(p) {
            if self.get(n) == Some(stone.opponent()) {
                removed += self.remove_if_dead(n);
            }
        }
        self.captures[colour_slot(stone)] += removed;

        // Suicide is legal in some rule sets.
        let own = self.remove_if_dead(p);
        self.captures[colour_slot(stone.opponent())] += own;
        removed + own
    }

    pub fn pass(&mut self) {
        self.moves_played += 1;
        self.last_move = None;
    }

    fn remove_if_dead(&mut self, p: Point) -> usize {
        let Some(stone) = self.get(p) else {
            return 0;
        };

        let stamp = self.next_stamp();
        let start = self.offset(p);
        self.marks[start] = stamp;

        let mut group = Vec::new();
        let mut pending = vec![p];
        while let Some(current) = pending.pop() {
            group.push(current);
            for n in self.neighbours(current) {
                let at = self.offset(n);
                match self.cells[at] {
                    None => return 0,
                    Some(s) if s == stone && self.marks[at] != stamp => {
                        self.marks[at] = stamp;
                        pending.push(n);
                    }
                    _ => {}
                }
            }
        }

        for point in &group {
            self.set(*point, None);
        }
        group.len()
    }

    fn next_stamp(&mut self) -> u32 {
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            self.marks.fill(0);
            self.stamp = 1;
        }
        self.stamp
    }

    fn neighbours(&self, p: Point) -> impl Iterator<Item = Point> {
        let size = self.size;
        let candidates = [
            (p.x.checked_sub(1), Some(p.y)),
            (Some(p.x + 1), Some(p.y)),
            (Some(p.x), p.y.checked_sub(1)),
            (Some(p.x), Some(p.y + 1)),
        ];
        candidates.into_iter().filter_map(move |(x, y)| match (x, y) {
            (Some(x), Some(y)) if x < size && y < size => Some(Point { x, y }),
            _ => None,
        })
    }

    fn offset(&self, p: Point) -> usize {
        p.y * self.size + p.x
    }
}

fn colour_slot(stone: Stone) -> usize {
    match stone {
        Stone::Black => 0,
        Stone::White => 1,
    }
}

/// `a`-`z` then `A`-`Z`, as SGF writes coordinates.
fn coordinate(ch: u8) -> Option<usize> {
    match ch {
        b'a'..=b'z' => Some((ch - b'a') as usize),
        b'A'..=b'Z' => Some((ch - b'A') as usize + 26),
        _ => None,
    }
}

/// A single point, or `None` for a pass or a point off the board.
pub fn parse_point(value: &str, size: usize) -> Option<Point> {
    let bytes = value.trim().as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let x = coordinate(bytes[0])?;
    let y = coordinate(bytes[1])?;
    (x < size && y < size).then_some(Point { x, y })
}

/// A point list value, expanding compressed `aa:cc` rectangles.
pub fn parse_points(value: &str, size: usize) -> Vec<Point> {
    match value.split_once(':') {
        Some((from, to)) => {
            let (Some(a), Some(b)) = (parse_point(from, size), parse_point(to, size)) else {
                return Vec::new();
            };
            let mut points = Vec::new();
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                for x in a.x.min(b.x)..=a.x.max(b.x) {
                    points.push(Point { x, y });
                }
            }
            points
        }
        None => parse_point(value, size).into_iter().collect(),
    }
}

fn apply_setup(board: &mut Board, node: &GameNode) {
    let size = board.size();
    for (tag, stone) in [
        (Tag::AddEmpty, None),
        (Tag::AddBlack, Some(Stone::Black)),
        (Tag::AddWhite, Some(Stone::White)),
    ] {
        for value in node.properties.get(tag).unwrap_or_default() {
            for point in parse_points(value, size) {
                board.set(point, stone);
            }
        }
    }
}

/// Replay the main line up to and including the 0-based `move_index`, or to the
/// end when it is `None`.
///
/// Moves in side variations are not on the main line, so an index past its end
/// shows the final main-line position.
pub fn replay(tree: &GameTree, size: usize, move_index: Option<usize>) -> Board {
    let mut board = Board::new(size);
    let limit = move_index.map(|index| index + 1);

    for (depth, node) in tree.main_line().enumerate() {
        if limit.is_some_and(|limit| board.moves_played() >= limit) {
            break;
        }
        apply_setup(&mut board, node);
        if depth == 0 {
            continue;
        }
        if let Some((stone, value)) = node.played_move() {
            match parse_point(value, size) {
                Some(point) => {
                    board.play(stone, point);
                }
                None => board.pass(),
            }
        }
    }
    board
}
