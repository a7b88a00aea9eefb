use std::collections::{HashMap, HashSet};

use glam::Vec3;

use crate::{config::DEFAULT_BROADPHASE_CELL_SIZE, core::body::BodyHandle};

/// Candidate pair of indices into the per-step working set, ordered so the
/// lower index is always `a`. Produced fresh every step, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    pub a: usize,
    pub b: usize,
}

impl CollisionPair {
    pub fn new(first: usize, second: usize) -> Self {
        if first < second {
            Self { a: first, b: second }
        } else {
            Self { a: second, b: first }
        }
    }
}

/// Broad-phase contract: produce a superset of the truly colliding pairs.
///
/// Implementations may over-report but must never miss a pair the narrow
/// phase would confirm. Pairs with no awake dynamic participant may be
/// pruned — such pairs structurally cannot produce a response, and pruning
/// them is what lets a sleeping body rest on a static one undisturbed.
pub trait Broadphase: Send + Sync {
    fn find_potential_pairs(&mut self, bodies: &[BodyHandle], pairs: &mut Vec<CollisionPair>);
}

struct BroadphaseEntry {
    index: usize,
    position: Vec3,
    radius: f32,
    is_static: bool,
    is_awake: bool,
}

fn snapshot_entries(bodies: &[BodyHandle]) -> Vec<BroadphaseEntry> {
    bodies
        .iter()
        .enumerate()
        .map(|(index, handle)| {
            let mut body = handle.write();
            let (position, radius) = body.bounds();
            BroadphaseEntry {
                index,
                position,
                radius,
                is_static: body.is_static,
                is_awake: body.is_awake(),
            }
        })
        .collect()
}

fn pair_admissible(a: &BroadphaseEntry, b: &BroadphaseEntry) -> bool {
    let a_active = a.is_awake && !a.is_static;
    let b_active = b.is_awake && !b.is_static;
    a_active || b_active
}

/// All unordered pairs of admissible bodies. Trivially sound; used as the
/// reference implementation in tests and for tiny scenes.
#[derive(Debug, Default)]
pub struct BruteForceBroadphase;

impl BruteForceBroadphase {
    pub fn new() -> Self {
        Self
    }
}

impl Broadphase for BruteForceBroadphase {
    fn find_potential_pairs(&mut self, bodies: &[BodyHandle], pairs: &mut Vec<CollisionPair>) {
        let entries = snapshot_entries(bodies);
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                if pair_admissible(&entries[i], &entries[j]) {
                    pairs.push(CollisionPair::new(entries[i].index, entries[j].index));
                }
            }
        }
    }
}

/// Uniform hash grid over body bounding spheres. Each body is inserted into
/// every cell its sphere touches, so any two overlapping spheres share at
/// least one cell.
pub struct SpatialGridBroadphase {
    cell_size: f32,
    grid: HashMap<(i32, i32, i32), Vec<usize>>,
    min_separation: f32,
}

impl Default for SpatialGridBroadphase {
    fn default() -> Self {
        Self::new(DEFAULT_BROADPHASE_CELL_SIZE)
    }
}

impl SpatialGridBroadphase {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            grid: HashMap::new(),
            min_separation: 0.01,
        }
    }

    fn world_to_grid(&self, pos: Vec3) -> (i32, i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
            (pos.z / self.cell_size).floor() as i32,
        )
    }

    fn insert(&mut self, entry_slot: usize, position: Vec3, radius: f32) {
        let min_cell = self.world_to_grid(position - Vec3::splat(radius));
        let max_cell = self.world_to_grid(position + Vec3::splat(radius));

        for x in min_cell.0..=max_cell.0 {
            for y in min_cell.1..=max_cell.1 {
                for z in min_cell.2..=max_cell.2 {
                    self.grid.entry((x, y, z)).or_default().push(entry_slot);
                }
            }
        }
    }

    fn query(&self, position: Vec3, radius: f32, results: &mut Vec<usize>) {
        results.clear();
        let min_cell = self.world_to_grid(position - Vec3::splat(radius));
        let max_cell = self.world_to_grid(position + Vec3::splat(radius));

        for x in min_cell.0..=max_cell.0 {
            for y in min_cell.1..=max_cell.1 {
                for z in min_cell.2..=max_cell.2 {
                    if let Some(slots) = self.grid.get(&(x, y, z)) {
                        results.extend_from_slice(slots);
                    }
                }
            }
        }

        results.sort_unstable();
        results.dedup();
    }
}

impl Broadphase for SpatialGridBroadphase {
    fn find_potential_pairs(&mut self, bodies: &[BodyHandle], pairs: &mut Vec<CollisionPair>) {
        let entries = snapshot_entries(bodies);

        self.grid.clear();
        for (slot, entry) in entries.iter().enumerate() {
            self.insert(slot, entry.position, entry.radius);
        }

        let mut checked = HashSet::new();
        let mut nearby = Vec::new();
        for (slot, entry) in entries.iter().enumerate() {
            self.query(entry.position, entry.radius, &mut nearby);

            for &other_slot in &nearby {
                if other_slot == slot {
                    continue;
                }
                let other = &entries[other_slot];
                if !pair_admissible(entry, other) {
                    continue;
                }

                let reach = entry.radius + other.radius + self.min_separation;
                if entry.position.distance_squared(other.position) > reach * reach {
                    continue;
                }

                let pair = CollisionPair::new(entry.index, other.index);
                if checked.insert((pair.a, pair.b)) {
                    pairs.push(pair);
                }
            }
        }
    }
}
