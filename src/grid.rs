use serde::{Deserialize, Serialize};

/// Column-major flat grid: `index = x * h + y`. Every per-cell layer of a
/// generated world uses this layout, so buffers can be handed out as-is.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub w: usize,
    pub h: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, T::default())
    }
}

impl<T: Copy> Grid<T> {
    pub fn filled(w: usize, h: usize, v: T) -> Self {
        Self {
            data: vec![v; w * h],
            w,
            h,
        }
    }

    /// Wrap an existing column-major buffer. Panics on a length mismatch.
    pub fn from_vec(w: usize, h: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), w * h, "buffer length does not match {w}x{h}");
        Self { data, w, h }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        assert!(x < self.w && y < self.h, "({x}, {y}) outside {}x{}", self.w, self.h);
        x * self.h + y
    }

    #[inline]
    pub fn xy(&self, i: usize) -> (usize, usize) {
        (i / self.h, i % self.h)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: T) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Signed lookup; `None` off the map.
    #[inline]
    pub fn try_get(&self, x: i64, y: i64) -> Option<T> {
        if x < 0 || y < 0 || x >= self.w as i64 || y >= self.h as i64 {
            return None;
        }
        Some(self.data[x as usize * self.h + y as usize])
    }

    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Grid<U> {
        Grid {
            data: self.data.iter().map(|&v| f(v)).collect(),
            w: self.w,
            h: self.h,
        }
    }
}

/// Cardinal flow/neighbor direction. `Up` is towards y = 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    #[default]
    None = 0,
    Up = 1,
    Down = 2,
    Left = 3,
    Right = 4,
}

impl Direction {
    /// Probe order for neighbors and for picking an edge cell's off-map exit.
    pub const PROBE: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::None => Direction::None,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        Ok(match code {
            0 => Direction::None,
            1 => Direction::Up,
            2 => Direction::Down,
            3 => Direction::Left,
            4 => Direction::Right,
            _ => return Err(code),
        })
    }
}

/// One in-bounds neighbor of a cell and the direction leading to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Link {
    pub cell: u32,
    pub dir: Direction,
}

/// Precomputed 4-connected, edge-clipped neighbor lists.
/// Built once per run and shared by every traversal stage.
pub struct Topology {
    pub w: usize,
    pub h: usize,
    links: Vec<[Link; 4]>,
    counts: Vec<u8>,
}

impl Topology {
    pub fn new(w: usize, h: usize) -> Self {
        let n = w * h;
        let mut links = vec![[Link::default(); 4]; n];
        let mut counts = vec![0u8; n];
        for x in 0..w {
            for y in 0..h {
                let i = x * h + y;
                let mut k = 0;
                for dir in Direction::PROBE {
                    let (dx, dy) = dir.offset();
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                        continue;
                    }
                    links[i][k] = Link {
                        cell: (nx as usize * h + ny as usize) as u32,
                        dir,
                    };
                    k += 1;
                }
                counts[i] = k as u8;
            }
        }
        Self { w, h, links, counts }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[inline]
    pub fn neighbors(&self, i: usize) -> &[Link] {
        &self.links[i][..self.counts[i] as usize]
    }

    /// Map-edge cells are the ones with fewer than four neighbors.
    #[inline]
    pub fn is_edge(&self, i: usize) -> bool {
        self.counts[i] < 4
    }

    /// First off-map direction of an edge cell, `None` for interior cells.
    pub fn exit(&self, i: usize) -> Direction {
        let x = (i / self.h) as i64;
        let y = (i % self.h) as i64;
        Direction::PROBE
            .into_iter()
            .find(|d| {
                let (dx, dy) = d.offset();
                let (nx, ny) = (x + dx, y + dy);
                nx < 0 || ny < 0 || nx >= self.w as i64 || ny >= self.h as i64
            })
            .unwrap_or(Direction::None)
    }

    /// Cell reached by stepping `dir` from `i`, if it stays on the map.
    pub fn step(&self, i: usize, dir: Direction) -> Option<usize> {
        self.neighbors(i)
            .iter()
            .find(|l| l.dir == dir)
            .map(|l| l.cell as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_major_layout() {
        let mut g: Grid<u8> = Grid::new(3, 2);
        g.set(2, 1, 9);
        assert_eq!(g.data[2 * 2 + 1], 9);
        assert_eq!(g.xy(5), (2, 1));
        assert_eq!(g.get(2, 1), 9);
        assert_eq!(g.try_get(2, 1), Some(9));
        assert_eq!(g.try_get(-1, 0), None);
        assert_eq!(g.try_get(3, 0), None);
        assert_eq!(g.try_get(0, 2), None);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_get_panics() {
        let g: Grid<u8> = Grid::new(2, 2);
        g.get(2, 0);
    }

    #[test]
    fn corner_and_interior_neighbors() {
        let topo = Topology::new(3, 3);
        assert_eq!(topo.neighbors(0).len(), 2);
        assert!(topo.is_edge(0));
        let centre = 3 + 1;
        assert_eq!(topo.neighbors(centre).len(), 4);
        assert!(!topo.is_edge(centre));
        assert_eq!(topo.exit(centre), Direction::None);
        assert_eq!(topo.exit(0), Direction::Left);
        // bottom-middle cell (1, 2) only leaves the map downwards
        assert_eq!(topo.exit(3 + 2), Direction::Down);
    }

    #[test]
    fn step_follows_offsets() {
        let topo = Topology::new(4, 3);
        let i = 1 * 3 + 1;
        assert_eq!(topo.step(i, Direction::Right), Some(2 * 3 + 1));
        assert_eq!(topo.step(i, Direction::Up), Some(1 * 3));
        assert_eq!(topo.step(0, Direction::Left), None);
    }

    #[test]
    fn direction_codes_round_trip() {
        for d in [Direction::None, Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert_eq!(Direction::try_from(d as u8), Ok(d));
            assert_eq!(d.opposite().opposite(), d);
        }
        assert_eq!(Direction::try_from(9), Err(9));
    }
}
