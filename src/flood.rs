//! Two-queue priority-flood traversal (Barnes et al., "Priority-Flood").
//!
//! Map-edge cells seed a min-priority queue keyed by surface level. Cells reached
//! at or below the level of the cell that reached them go to a FIFO pit queue and
//! are drained before the heap is touched again, so depressions and plateaus
//! are swept in one pass without requeuing. Every cell is reached exactly once.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use crate::grid::{Direction, Grid, Topology};

/// Heap entry: lowest level first, then insertion order.
#[derive(Clone, Copy, PartialEq, Eq)]
struct FloodEntry {
    level: u8,
    seq: u32,
    idx: u32,
}

impl PartialOrd for FloodEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloodEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse both keys.
        other
            .level
            .cmp(&self.level)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Per-stage behaviour plugged into [`priority_flood`].
pub trait FloodVisitor {
    /// A cell left one of the queues and is about to expand its neighbors.
    fn settle(&mut self, _cell: usize) {}

    /// `to` was reached for the first time from `from`, stepping `dir`.
    /// `level` is the flood level `from` was settled at.
    fn reach(&mut self, from: usize, to: usize, dir: Direction, level: u8);

    /// `from` touched `to`, which had already been reached or seeded.
    fn revisit(&mut self, _from: usize, _to: usize, _level: u8) {}
}

/// Run the traversal over `surface`, seeded from every map-edge cell.
pub fn priority_flood<V: FloodVisitor>(topo: &Topology, surface: &Grid<u8>, visitor: &mut V) {
    let n = topo.len();
    let mut closed = vec![false; n];
    let mut open = BinaryHeap::new();
    let mut pit: VecDeque<(usize, u8)> = VecDeque::new();
    let mut seq = 0u32;

    for i in 0..n {
        if topo.is_edge(i) {
            closed[i] = true;
            open.push(FloodEntry {
                level: surface.data[i],
                seq,
                idx: i as u32,
            });
            seq += 1;
        }
    }

    loop {
        let (cell, level) = if let Some(entry) = pit.pop_front() {
            entry
        } else if let Some(entry) = open.pop() {
            (entry.idx as usize, entry.level)
        } else {
            break;
        };

        visitor.settle(cell);

        for link in topo.neighbors(cell) {
            let to = link.cell as usize;
            if closed[to] {
                visitor.revisit(cell, to, level);
                continue;
            }
            closed[to] = true;
            visitor.reach(cell, to, link.dir, level);

            let own = surface.data[to];
            if own <= level {
                pit.push_back((to, level));
            } else {
                open.push(FloodEntry {
                    level: own,
                    seq,
                    idx: to as u32,
                });
                seq += 1;
            }
        }
    }
}
