//! Pure pointer geometry for the mindmap canvas. No event plumbing here;
//! the GUI feeds pointer coordinates in and dispatches on the results.

use crate::{Rect, Vec2};
use entimap_core::EntityId;

pub const NODE_WIDTH: f32 = 160.0;
pub const NODE_HEIGHT: f32 = 80.0;
pub const HEADER_HEIGHT: f32 = 24.0;
/// A drag grabs the nearest node within this distance of the pointer.
pub const DRAG_RADIUS: f32 = 100.0;

const ACTION_ZONE_HEIGHT: f32 = 25.0;

/// Per-node action buttons in the card header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    Edit,
    Delete,
}

/// What the pointer is over, resolved to a node and the action zone it hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverTarget {
    pub node_id: EntityId,
    pub action: NodeAction,
}

/// Card rectangle for a node centered at `center`.
pub fn card_rect(center: Vec2) -> Rect {
    Rect::from_center_size(center, Vec2::new(NODE_WIDTH, NODE_HEIGHT))
}

/// Edit button zone in the card's top-right corner, left of the delete zone.
pub fn edit_zone(center: Vec2) -> Rect {
    let card = card_rect(center);
    Rect {
        min: Vec2::new(card.max.x - 40.0, card.min.y),
        max: Vec2::new(card.max.x - 25.0, card.min.y + ACTION_ZONE_HEIGHT),
    }
}

/// Delete button zone flush with the card's top-right corner.
pub fn delete_zone(center: Vec2) -> Rect {
    let card = card_rect(center);
    Rect {
        min: Vec2::new(card.max.x - 25.0, card.min.y),
        max: Vec2::new(card.max.x, card.min.y + ACTION_ZONE_HEIGHT),
    }
}

/// Resolve the pointer against each node's action zones, first match wins.
/// Nodes arrive in stable build order so overlapping cards resolve the same
/// way every frame.
pub fn hit_test_action<'a, I>(pointer: Vec2, nodes: I) -> Option<HoverTarget>
where
    I: IntoIterator<Item = (&'a EntityId, Vec2)>,
{
    for (id, center) in nodes {
        if edit_zone(center).contains(pointer) {
            return Some(HoverTarget {
                node_id: id.clone(),
                action: NodeAction::Edit,
            });
        }
        if delete_zone(center).contains(pointer) {
            return Some(HoverTarget {
                node_id: id.clone(),
                action: NodeAction::Delete,
            });
        }
    }
    None
}

/// Nearest node center within [`DRAG_RADIUS`] of the pointer, if any.
pub fn find_drag_target<'a, I>(pointer: Vec2, nodes: I) -> Option<EntityId>
where
    I: IntoIterator<Item = (&'a EntityId, Vec2)>,
{
    let mut best: Option<(&EntityId, f32)> = None;
    for (id, center) in nodes {
        let dist = pointer.distance(center);
        if dist > DRAG_RADIUS {
            continue;
        }
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((id, dist));
        }
    }
    best.map(|(id, _)| id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(s: &str) -> EntityId {
        EntityId(s.into())
    }

    #[test]
    fn zones_sit_in_the_header_strip() {
        let center = Vec2::new(400.0, 300.0);
        let card = card_rect(center);
        let edit = edit_zone(center);
        let delete = delete_zone(center);

        assert_eq!(card.width(), NODE_WIDTH);
        assert_eq!(card.height(), NODE_HEIGHT);
        assert_eq!(edit.max.x, delete.min.x);
        assert_eq!(delete.max.x, card.max.x);
        assert_eq!(edit.min.y, card.min.y);
        assert!(edit.max.y <= card.min.y + ACTION_ZONE_HEIGHT);
    }

    #[test]
    fn pointer_in_edit_zone_resolves_to_edit() {
        let a = id("a");
        let center = Vec2::new(400.0, 300.0);
        let probe = edit_zone(center).center();
        let hit = hit_test_action(probe, [(&a, center)]);
        assert_eq!(
            hit,
            Some(HoverTarget {
                node_id: a.clone(),
                action: NodeAction::Edit,
            })
        );
    }

    #[test]
    fn pointer_in_delete_zone_resolves_to_delete() {
        let a = id("a");
        let center = Vec2::new(400.0, 300.0);
        let probe = delete_zone(center).center();
        let hit = hit_test_action(probe, [(&a, center)]);
        assert_eq!(hit.map(|h| h.action), Some(NodeAction::Delete));
    }

    #[test]
    fn pointer_in_card_body_is_not_an_action() {
        let a = id("a");
        let center = Vec2::new(400.0, 300.0);
        assert_eq!(hit_test_action(center, [(&a, center)]), None);
    }

    #[test]
    fn first_node_wins_when_zones_overlap() {
        let a = id("a");
        let b = id("b");
        let center = Vec2::new(400.0, 300.0);
        let probe = edit_zone(center).center();
        let hit = hit_test_action(probe, [(&a, center), (&b, center)]);
        assert_eq!(hit.map(|h| h.node_id), Some(a));
    }

    #[test]
    fn drag_target_is_nearest_within_radius() {
        let a = id("a");
        let b = id("b");
        let nodes = [(&a, Vec2::new(100.0, 100.0)), (&b, Vec2::new(160.0, 100.0))];
        let grabbed = find_drag_target(Vec2::new(140.0, 100.0), nodes);
        assert_eq!(grabbed, Some(b));
    }

    #[test]
    fn drag_misses_outside_radius() {
        let a = id("a");
        let nodes = [(&a, Vec2::new(100.0, 100.0))];
        assert_eq!(
            find_drag_target(Vec2::new(100.0 + DRAG_RADIUS + 1.0, 100.0), nodes),
            None
        );
    }

    #[test]
    fn delete_zone_click_resolves_through_live_simulation_positions() {
        use crate::model::{GraphEdge, GraphNode, MindmapModel};
        use crate::simulation::{Simulation, SimulationParams};

        let a = id("a");
        let b = id("b");
        let model = MindmapModel {
            nodes: vec![
                GraphNode {
                    id: a.clone(),
                    title: "A".into(),
                    type_label: "T".into(),
                    spawn: Vec2::new(100.0, 100.0),
                },
                GraphNode {
                    id: b.clone(),
                    title: "B".into(),
                    type_label: "T".into(),
                    spawn: Vec2::new(300.0, 100.0),
                },
            ],
            edges: vec![GraphEdge {
                source: a.clone(),
                target: b.clone(),
            }],
        };
        let mut sim = Simulation::new(&model, SimulationParams::default());
        sim.pin(&a, Vec2::new(100.0, 100.0));
        sim.pin(&b, Vec2::new(300.0, 100.0));
        sim.step();

        let b_pos = sim.position(&b).unwrap();
        assert_eq!(b_pos, Vec2::new(300.0, 100.0));

        let probe = delete_zone(b_pos).center();
        let hit = hit_test_action(probe, sim.positions());
        assert_eq!(
            hit,
            Some(HoverTarget {
                node_id: b,
                action: NodeAction::Delete,
            })
        );
    }

    proptest! {
        #[test]
        fn any_point_in_a_zone_reports_that_zone(
            cx in -1000.0f32..1000.0,
            cy in -1000.0f32..1000.0,
            fx in 0.0f32..1.0,
            fy in 0.0f32..1.0,
            delete in proptest::bool::ANY,
        ) {
            let a = id("a");
            let center = Vec2::new(cx, cy);
            let zone = if delete { delete_zone(center) } else { edit_zone(center) };
            let probe = Vec2::new(
                zone.min.x + fx * zone.width(),
                zone.min.y + fy * zone.height(),
            );
            let hit = hit_test_action(probe, [(&a, center)]);
            // The shared boundary between the zones resolves to Edit first.
            let on_seam = delete && probe.x <= zone.min.x;
            let expected = if delete && !on_seam { NodeAction::Delete } else { NodeAction::Edit };
            prop_assert_eq!(hit.map(|h| h.action), Some(expected));
        }

        #[test]
        fn points_outside_the_header_never_hit(
            cx in -1000.0f32..1000.0,
            cy in -1000.0f32..1000.0,
            dx in -500.0f32..500.0,
            dy in 30.0f32..500.0,
        ) {
            let a = id("a");
            let center = Vec2::new(cx, cy);
            let card = card_rect(center);
            // Anywhere below the action strip, inside or outside the card.
            let probe = Vec2::new(card.min.x + dx, card.min.y + dy);
            prop_assert_eq!(hit_test_action(probe, [(&a, center)]), None);
        }
    }
}
