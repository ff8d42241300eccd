use crate::Vec2;
use entimap_core::{AppData, AttributeKind, EntityId};
use rand::Rng;
use std::collections::HashSet;

/// Extent of the area new nodes are scattered over before the simulation
/// takes over.
pub const SPAWN_WIDTH: f32 = 800.0;
pub const SPAWN_HEIGHT: f32 = 600.0;

/// Immutable display record for one entity. Position lives in the
/// simulation's physics table, not here; rebuilding the model never aliases
/// stale physics state.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: EntityId,
    pub title: String,
    pub type_label: String,
    /// Pseudo-random spawn point, consumed once by the simulation.
    pub spawn: Vec2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: EntityId,
    pub target: EntityId,
}

/// Node and edge collections derived from an [`AppData`] snapshot.
///
/// Rebuilt from scratch whenever the snapshot changes; never fails. Dangling
/// type references fall back to placeholder labels and dangling link targets
/// are dropped.
#[derive(Debug, Clone, Default)]
pub struct MindmapModel {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl MindmapModel {
    /// Derive nodes and edges from the data snapshot. The RNG seeds initial
    /// positions, so layouts are reproducible under a fixed seed.
    pub fn build<R: Rng>(data: &AppData, rng: &mut R) -> Self {
        let mut nodes = Vec::with_capacity(data.entities.len());
        let mut node_ids = HashSet::with_capacity(data.entities.len());

        for entity in &data.entities {
            nodes.push(GraphNode {
                id: entity.id.clone(),
                title: data.entity_title(entity),
                type_label: data.type_label(entity),
                spawn: Vec2::new(
                    rng.gen_range(0.0..SPAWN_WIDTH),
                    rng.gen_range(0.0..SPAWN_HEIGHT),
                ),
            });
            node_ids.insert(entity.id.clone());
        }

        let mut edges = Vec::new();
        for entity in &data.entities {
            let Some(ty) = data.type_by_id(&entity.type_id) else {
                continue;
            };
            for attr in &ty.attributes {
                if attr.kind != AttributeKind::Link {
                    continue;
                }
                let Some(value) = entity.value(&attr.id) else {
                    continue;
                };
                if value.is_empty() {
                    continue;
                }
                let target = EntityId(value.to_string());
                if node_ids.contains(&target) {
                    edges.push(GraphEdge {
                        source: entity.id.clone(),
                        target,
                    });
                } else {
                    tracing::warn!(
                        "Dropping link from entity {} because target {} is missing from the snapshot",
                        entity.id,
                        target
                    );
                }
            }
        }

        Self { nodes, edges }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
