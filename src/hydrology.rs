use crate::flood::{priority_flood, FloodVisitor};
use crate::grid::{Direction, Grid, Topology};

/// Raises each reached cell towards the flood level it was reached at.
struct DepressionFill<'a> {
    height: &'a Grid<u8>,
    water: Grid<u8>,
    fill: f32,
    raised: usize,
}

impl FloodVisitor for DepressionFill<'_> {
    fn reach(&mut self, _from: usize, to: usize, _dir: Direction, level: u8) {
        let own = self.height.data[to];
        if own <= level {
            let raise = (level - own) as f32 * self.fill;
            self.water.data[to] = own + raise.round() as u8;
            self.raised += 1;
        }
    }
}

/// Priority-flood depression removal. Every cell ends up with a
/// non-increasing path to the map edge on the returned water surface
/// (for `fill = 1.0`); `water >= height` always holds.
pub fn remove_depressions(topo: &Topology, height: &Grid<u8>, fill: f32) -> Grid<u8> {
    let mut visitor = DepressionFill {
        height,
        water: height.clone(),
        fill: fill.clamp(0.0, 1.0),
        raised: 0,
    };
    priority_flood(topo, height, &mut visitor);
    log::debug!("depression cells: {}", visitor.raised);
    visitor.water
}

/// Points each reached cell back at the cell that reached it.
struct FlowRouter {
    flow: Grid<Direction>,
}

impl FloodVisitor for FlowRouter {
    fn reach(&mut self, _from: usize, to: usize, dir: Direction, _level: u8) {
        self.flow.data[to] = dir.opposite();
    }
}

/// One outward direction per cell. Edge cells drain off the map; every other
/// cell points at its discoverer in the flood order, so the result is a forest
/// rooted at the edge.
pub fn route_flow(topo: &Topology, water: &Grid<u8>) -> Grid<Direction> {
    let mut flow = Grid::new(topo.w, topo.h);
    for i in 0..topo.len() {
        if topo.is_edge(i) {
            flow.data[i] = topo.exit(i);
        }
    }
    let mut router = FlowRouter { flow };
    priority_flood(topo, water, &mut router);
    router.flow
}

/// Cells whose flow direction points at `i`.
fn upstream_of<'a>(
    topo: &'a Topology,
    flow: &'a Grid<Direction>,
    i: usize,
) -> impl Iterator<Item = usize> + 'a {
    topo.neighbors(i)
        .iter()
        .filter(move |l| flow.data[l.cell as usize] == l.dir.opposite())
        .map(|l| l.cell as usize)
}

/// Number of cells draining through each cell of the subtrees hanging off
/// `roots`. Cells outside those subtrees stay at zero. Iterative post-order
/// over the reversed flow forest, each cell counted once.
pub fn count_upstream(topo: &Topology, flow: &Grid<Direction>, roots: &[usize]) -> Grid<u32> {
    let mut counts: Grid<u32> = Grid::new(topo.w, topo.h);
    let mut done = vec![false; topo.len()];
    let mut stack: Vec<(usize, bool)> = Vec::new();

    for &root in roots {
        if done[root] {
            continue;
        }
        stack.push((root, false));
        while let Some((cell, expanded)) = stack.pop() {
            if done[cell] {
                continue;
            }
            if expanded {
                counts.data[cell] = upstream_of(topo, flow, cell)
                    .map(|up| 1 + counts.data[up])
                    .sum();
                done[cell] = true;
            } else {
                stack.push((cell, true));
                stack.extend(
                    upstream_of(topo, flow, cell)
                        .filter(|&up| !done[up])
                        .map(|up| (up, false)),
                );
            }
        }
    }

    counts
}
