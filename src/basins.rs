use std::collections::BTreeMap;

use crate::flood::{priority_flood, FloodVisitor};
use crate::grid::{Direction, Grid, Topology};
use crate::rng::Rng;
use crate::terrain::TerrainType;

const SALT_BASIN: u64 = 0xBA51_C010_0001;

/// A drainage basin. Built once after labelling and never changed.
#[derive(Clone, Debug, PartialEq)]
pub struct DrainageBasin {
    id: u32,
    color: u32,
    cells: Vec<(u32, u32)>,
}

impl DrainageBasin {
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 0xRRGGBB display color.
    pub fn color(&self) -> u32 {
        self.color
    }

    /// Member cells as (x, y).
    pub fn cells(&self) -> &[(u32, u32)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Label {
    Unset,
    /// Outlet cell waiting for its first settle.
    Pending,
    /// Sea cell; carries no label and passes `Pending` on.
    Outlet,
    Set(u32),
}

struct BasinLabeler<'a> {
    topo: &'a Topology,
    water: &'a Grid<u8>,
    labels: Vec<Label>,
    next: u32,
}

impl FloodVisitor for BasinLabeler<'_> {
    fn settle(&mut self, cell: usize) {
        if self.labels[cell] != Label::Pending {
            return;
        }
        // Join a basin this cell spills into, else open a new one.
        let own = self.water.data[cell];
        let joined = self.topo.neighbors(cell).iter().find_map(|l| {
            match self.labels[l.cell as usize] {
                Label::Set(id) if self.water.data[l.cell as usize] < own => Some(id),
                _ => None,
            }
        });
        self.labels[cell] = Label::Set(joined.unwrap_or_else(|| {
            let id = self.next;
            self.next += 1;
            id
        }));
    }

    fn reach(&mut self, from: usize, to: usize, _dir: Direction, _level: u8) {
        if self.labels[to] == Label::Outlet {
            return;
        }
        self.labels[to] = match self.labels[from] {
            Label::Set(id) => Label::Set(id),
            _ => Label::Pending,
        };
    }

    fn revisit(&mut self, from: usize, to: usize, level: u8) {
        // A pending outlet inside the pool being swept belongs to it.
        if self.labels[to] == Label::Pending && self.water.data[to] <= level {
            if let Label::Set(id) = self.labels[from] {
                self.labels[to] = Label::Set(id);
            }
        }
    }
}

/// Per-cell basin label over the water surface. Oceanic cells get `None`;
/// every other cell, lakes included, carries a label.
pub fn label_basins(
    topo: &Topology,
    water: &Grid<u8>,
    terrain: &Grid<TerrainType>,
) -> Grid<Option<u32>> {
    let labels = (0..topo.len())
        .map(|i| {
            if terrain.data[i].is_oceanic() {
                Label::Outlet
            } else if topo.is_edge(i) {
                Label::Pending
            } else {
                Label::Unset
            }
        })
        .collect();
    let mut labeler = BasinLabeler {
        topo,
        water,
        labels,
        next: 1,
    };
    priority_flood(topo, water, &mut labeler);

    let mut out = Grid::new(topo.w, topo.h);
    for (slot, label) in out.data.iter_mut().zip(&labeler.labels) {
        *slot = match label {
            Label::Set(id) => Some(*id),
            _ => None,
        };
    }
    out
}

/// Group labelled land cells into basins, coloring each the first time its
/// id is met in index order. Water cells (sea, coast, lake) are not members
/// and their labels are cleared in `labels`.
pub fn collect_basins(
    labels: &mut Grid<Option<u32>>,
    terrain: &Grid<TerrainType>,
    seed: u64,
) -> BTreeMap<u32, DrainageBasin> {
    let mut rng = Rng::new(seed ^ SALT_BASIN);
    let mut basins: BTreeMap<u32, DrainageBasin> = BTreeMap::new();

    for i in 0..labels.len() {
        if terrain.data[i].is_water() {
            labels.data[i] = None;
            continue;
        }
        let Some(id) = labels.data[i] else {
            continue;
        };
        let basin = basins.entry(id).or_insert_with(|| {
            let r = (rng.next_f32() * 255.0).round() as u32;
            let g = (rng.next_f32() * 255.0).round() as u32;
            let b = (rng.next_f32() * 255.0).round() as u32;
            DrainageBasin {
                id,
                color: (r << 16) | (g << 8) | b,
                cells: Vec::new(),
            }
        });
        let (x, y) = labels.xy(i);
        basin.cells.push((x as u32, y as u32));
    }

    log::info!("drainage basins: {}", basins.len());
    basins
}
