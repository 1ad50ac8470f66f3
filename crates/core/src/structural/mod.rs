//! Structural support graph and cascading collapse
//!
//! A tile is structural when it blocks movement and its material is hard
//! enough to carry load. Structural tiles connect to their structural
//! 4-neighbours; a connected component stands as long as it contains at
//! least one foundation-bearing tile (the bottom map row, or any map edge
//! with [`FoundationRule::AnyEdge`]).
//!
//! Foundation is solved as a fixed point over the whole component, so an
//! island that loses its last grounded path several hops away still comes
//! down. After [`CollapseSystem::on_tile_destroyed`] returns, every surviving
//! structural tile that was connected to the destroyed one has foundation.

use crate::core_types::{GridPos, RandomSource};
use crate::error::DestructionError;
use crate::grid::TileGrid;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Which tiles count as resting on solid ground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FoundationRule {
    /// Bottom map row only
    #[default]
    BottomRow,
    /// Any cell on the map border
    AnyEdge,
}

/// Collapse tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollapseConfig {
    pub foundation: FoundationRule,
    /// Minimum debris damage dealt by a collapsing tile
    pub debris_damage_base: i32,
    /// Debris damage rolls `base + random(0..variance)`
    pub debris_damage_variance: i32,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            foundation: FoundationRule::BottomRow,
            debris_damage_base: 15,
            debris_damage_variance: 10,
        }
    }
}

impl CollapseConfig {
    /// # Errors
    /// Returns an error for negative debris damage values.
    pub fn validate(&self) -> Result<(), DestructionError> {
        if self.debris_damage_base < 0 {
            return Err(DestructionError::invalid_config(
                "collapse.debris_damage_base",
                format!("must not be negative, got {}", self.debris_damage_base),
            ));
        }
        if self.debris_damage_variance < 0 {
            return Err(DestructionError::invalid_config(
                "collapse.debris_damage_variance",
                format!("must not be negative, got {}", self.debris_damage_variance),
            ));
        }
        Ok(())
    }
}

/// Support state of one structural tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralSupport {
    /// Reaches a foundation-bearing tile through structural tiles
    pub has_foundation: bool,
    /// Material hardness
    pub strength: i32,
    /// Structural 4-neighbours still standing
    pub connections: Vec<GridPos>,
}

/// One tile brought down by a collapse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapseResult {
    pub position: GridPos,
    /// Damage dealt to whatever stands on the tile
    pub debris_damage: i32,
    pub material_name: String,
}

/// Support graph over the structural tiles of a grid
#[derive(Debug, Clone, Default)]
pub struct CollapseSystem {
    config: CollapseConfig,
    supports: FxHashMap<GridPos, StructuralSupport>,
}

impl CollapseSystem {
    pub fn new(config: CollapseConfig) -> Self {
        Self {
            config,
            supports: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &CollapseConfig {
        &self.config
    }

    pub fn structural_count(&self) -> usize {
        self.supports.len()
    }

    pub fn support(&self, pos: GridPos) -> Option<&StructuralSupport> {
        self.supports.get(&pos)
    }

    fn is_foundation_bearing(&self, grid: &TileGrid, pos: GridPos) -> bool {
        match self.config.foundation {
            FoundationRule::BottomRow => grid.is_bottom_row(pos),
            FoundationRule::AnyEdge => grid.is_edge(pos),
        }
    }

    fn is_standing(grid: &TileGrid, pos: GridPos) -> bool {
        grid.get(pos).is_some_and(|t| t.is_structural())
    }

    /// Rebuild the whole graph from the grid
    pub fn rebuild_supports(&mut self, grid: &TileGrid) {
        self.supports = grid
            .positions()
            .filter(|pos| Self::is_standing(grid, *pos))
            .map(|pos| {
                let strength = grid.get(pos).map_or(0, |t| t.material().hardness);
                let connections = grid
                    .neighbors4(pos)
                    .filter(|n| Self::is_standing(grid, *n))
                    .collect();
                (
                    pos,
                    StructuralSupport {
                        has_foundation: false,
                        strength,
                        connections,
                    },
                )
            })
            .collect();
        self.refresh_foundations(grid);
        info!(
            structural = self.supports.len(),
            unsupported = self.supports.values().filter(|s| !s.has_foundation).count(),
            "structural supports rebuilt"
        );
    }

    /// Multi-source BFS from every foundation-bearing structural tile
    fn refresh_foundations(&mut self, grid: &TileGrid) {
        let mut queue: VecDeque<GridPos> = VecDeque::new();
        let mut grounded: FxHashSet<GridPos> = FxHashSet::default();

        let mut sources: Vec<GridPos> = self
            .supports
            .keys()
            .copied()
            .filter(|pos| self.is_foundation_bearing(grid, *pos))
            .collect();
        sources.sort_unstable();
        for pos in sources {
            grounded.insert(pos);
            queue.push_back(pos);
        }

        while let Some(pos) = queue.pop_front() {
            let Some(support) = self.supports.get(&pos) else {
                continue;
            };
            for next in &support.connections {
                if self.supports.contains_key(next) && grounded.insert(*next) {
                    queue.push_back(*next);
                }
            }
        }

        for (pos, support) in &mut self.supports {
            support.has_foundation = grounded.contains(pos);
        }
    }

    /// Structural tiles with neither foundation nor connections
    pub fn violations(&self) -> Vec<GridPos> {
        let mut out: Vec<GridPos> = self
            .supports
            .iter()
            .filter(|(_, s)| !s.has_foundation && s.connections.is_empty())
            .map(|(pos, _)| *pos)
            .collect();
        out.sort_unstable();
        out
    }

    /// Structural tiles without foundation
    pub fn unsupported(&self) -> Vec<GridPos> {
        let mut out: Vec<GridPos> = self
            .supports
            .iter()
            .filter(|(_, s)| !s.has_foundation)
            .map(|(pos, _)| *pos)
            .collect();
        out.sort_unstable();
        out
    }

    /// Drop `pos` from the graph and from its neighbours' connections
    fn detach(&mut self, pos: GridPos) -> bool {
        let Some(removed) = self.supports.remove(&pos) else {
            return false;
        };
        for neighbor in removed.connections {
            if let Some(support) = self.supports.get_mut(&neighbor) {
                support.connections.retain(|c| *c != pos);
            }
        }
        true
    }

    /// Structural component around `start` in BFS order, and whether any of
    /// it rests on foundation
    fn component(&self, grid: &TileGrid, start: GridPos) -> (Vec<GridPos>, bool) {
        let mut order = vec![start];
        let mut seen: FxHashSet<GridPos> = FxHashSet::default();
        seen.insert(start);
        let mut grounded = self.is_foundation_bearing(grid, start);
        let mut head = 0;

        while head < order.len() {
            let pos = order[head];
            head += 1;
            let Some(support) = self.supports.get(&pos) else {
                continue;
            };
            for next in &support.connections {
                if !Self::is_standing(grid, *next) || !seen.insert(*next) {
                    continue;
                }
                grounded |= self.is_foundation_bearing(grid, *next);
                order.push(*next);
            }
        }
        (order, grounded)
    }

    /// React to the destruction of the tile at `pos`.
    ///
    /// Every structural component next to it that no longer reaches a
    /// foundation collapses, tile by tile in BFS order from the destroyed
    /// tile. Returns the collapsed tiles in collapse order.
    pub fn on_tile_destroyed(
        &mut self,
        grid: &mut TileGrid,
        pos: GridPos,
        rng: &mut dyn RandomSource,
    ) -> Vec<CollapseResult> {
        let Some(neighbors) = self.supports.get(&pos).map(|s| s.connections.clone()) else {
            return Vec::new();
        };
        self.detach(pos);

        let mut condemned: Vec<GridPos> = Vec::new();
        let mut visited: FxHashSet<GridPos> = FxHashSet::default();
        for start in neighbors {
            if visited.contains(&start) || !Self::is_standing(grid, start) {
                continue;
            }
            let (component, grounded) = self.component(grid, start);
            visited.extend(component.iter().copied());
            if !grounded {
                debug!(x = start.x, y = start.y, tiles = component.len(), "component lost its foundation");
                condemned.extend(component);
            }
        }

        let mut results = Vec::with_capacity(condemned.len());
        for target in condemned {
            self.detach(target);
            let Some(tile) = grid.get_mut(target) else {
                continue;
            };
            if !tile.force_destroy() {
                continue;
            }
            let debris_damage = self.config.debris_damage_base
                + rng.range_i32(0, self.config.debris_damage_variance);
            results.push(CollapseResult {
                position: target,
                debris_damage,
                material_name: tile.material().name.clone(),
            });
        }

        self.refresh_foundations(grid);
        if !results.is_empty() {
            info!(x = pos.x, y = pos.y, collapsed = results.len(), "structural collapse");
        }
        results
    }
}
