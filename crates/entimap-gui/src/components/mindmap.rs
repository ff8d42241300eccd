use eframe::egui;
use entimap_core::{AppData, EntityId};
use entimap_graph::hit_test::{self, HEADER_HEIGHT, NODE_HEIGHT, NODE_WIDTH};
use entimap_graph::{
    HoverTarget, MindmapModel, NodeAction, Simulation, SimulationParams, Vec2,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Titles longer than this are cut to the first 18 chars plus an ellipsis.
const TITLE_MAX_CHARS: usize = 20;

const CANVAS_BG: egui::Color32 = egui::Color32::from_rgb(0xf8, 0xfa, 0xfc);
const EDGE_COLOR: egui::Color32 = egui::Color32::from_rgb(0xcb, 0xd5, 0xe1);
const CARD_BORDER: egui::Color32 = egui::Color32::from_rgb(0xe2, 0xe8, 0xef);
const HEADER_FILL: egui::Color32 = egui::Color32::from_rgb(0xf1, 0xf5, 0xf9);
const TYPE_TEXT: egui::Color32 = egui::Color32::from_rgb(0x94, 0xa3, 0xb8);
const TITLE_TEXT: egui::Color32 = egui::Color32::from_rgb(0x1e, 0x29, 0x3b);
const ICON_IDLE: egui::Color32 = egui::Color32::from_rgb(0x94, 0xa3, 0xb8);
const EDIT_HOVER: egui::Color32 = egui::Color32::from_rgb(0x25, 0x63, 0xeb);
const DELETE_HOVER: egui::Color32 = egui::Color32::from_rgb(0xef, 0x44, 0x44);

pub enum MindmapAction {
    Edit(EntityId),
    Delete(EntityId),
}

/// Force-directed canvas over the whole document. The display model and the
/// simulation are rebuilt whenever the document revision changes; pointer
/// interaction (drag, hover, header buttons) runs against the simulation's
/// current positions.
pub struct MindmapView {
    model: MindmapModel,
    sim: Simulation,
    hover: Option<HoverTarget>,
    dragging: Option<EntityId>,
    data_rev: u64,
    rng: StdRng,
}

impl MindmapView {
    pub fn new() -> Self {
        let model = MindmapModel::default();
        let sim = Simulation::new(&model, SimulationParams::default());
        Self {
            model,
            sim,
            hover: None,
            dragging: None,
            data_rev: u64::MAX,
            rng: StdRng::from_entropy(),
        }
    }

    /// Rebuild model and simulation if the document changed since the last
    /// frame. An in-flight drag does not survive a rebuild.
    pub fn sync(&mut self, data: &AppData, rev: u64) {
        if rev == self.data_rev {
            return;
        }
        self.model = MindmapModel::build(data, &mut self.rng);
        self.sim = Simulation::new(&self.model, SimulationParams::default());
        self.hover = None;
        self.dragging = None;
        self.data_rev = rev;
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) -> Option<MindmapAction> {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        self.sim.set_center(to_vec(rect.center()));
        if self.sim.is_active() {
            self.sim.step();
            ui.ctx().request_repaint();
        }

        if response.drag_started()
            && let Some(pos) = response.interact_pointer_pos()
        {
            let pointer = to_vec(pos);
            // Header buttons win over dragging.
            if hit_test::hit_test_action(pointer, self.sim.positions()).is_none()
                && let Some(id) = hit_test::find_drag_target(pointer, self.sim.positions())
            {
                self.sim.reheat();
                self.sim.pin(&id, pointer);
                self.dragging = Some(id);
            }
        }

        if let Some(id) = self.dragging.clone() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.sim.pin(&id, to_vec(pos));
            }
            if ui.input(|i| !i.pointer.primary_down()) {
                self.sim.unpin(&id);
                self.sim.cool();
                self.dragging = None;
            }
            ui.ctx().request_repaint();
        }

        self.hover = if self.dragging.is_none() {
            response
                .hover_pos()
                .and_then(|p| hit_test::hit_test_action(to_vec(p), self.sim.positions()))
        } else {
            None
        };
        if self.hover.is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let mut action = None;
        if response.clicked()
            && let Some(pos) = response.interact_pointer_pos()
            && let Some(target) = hit_test::hit_test_action(to_vec(pos), self.sim.positions())
        {
            action = Some(match target.action {
                NodeAction::Edit => MindmapAction::Edit(target.node_id),
                NodeAction::Delete => MindmapAction::Delete(target.node_id),
            });
        }

        self.paint(ui, rect);
        action
    }

    fn paint(&self, ui: &egui::Ui, rect: egui::Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, CANVAS_BG);

        for edge in &self.model.edges {
            let (Some(a), Some(b)) = (
                self.sim.position(&edge.source),
                self.sim.position(&edge.target),
            ) else {
                continue;
            };
            painter.line_segment([to_pos(a), to_pos(b)], egui::Stroke::new(1.5, EDGE_COLOR));
        }

        for node in &self.model.nodes {
            let Some(center) = self.sim.position(&node.id) else {
                continue;
            };
            self.paint_card(&painter, node, center);
        }
    }

    fn paint_card(
        &self,
        painter: &egui::Painter,
        node: &entimap_graph::GraphNode,
        center: Vec2,
    ) {
        let card = egui::Rect::from_center_size(
            to_pos(center),
            egui::vec2(NODE_WIDTH, NODE_HEIGHT),
        );

        painter.rect_filled(
            card.translate(egui::vec2(0.0, 4.0)),
            8.0,
            egui::Color32::from_rgba_unmultiplied(0x0f, 0x17, 0x2a, 24),
        );
        painter.rect_filled(card, 8.0, egui::Color32::WHITE);
        painter.rect_stroke(
            card,
            8.0,
            egui::Stroke::new(1.0, CARD_BORDER),
            egui::StrokeKind::Middle,
        );

        let header = egui::Rect::from_min_size(card.min, egui::vec2(card.width(), HEADER_HEIGHT));
        painter.rect_filled(
            header,
            egui::CornerRadius {
                nw: 8,
                ne: 8,
                sw: 0,
                se: 0,
            },
            HEADER_FILL,
        );

        painter.text(
            egui::pos2(card.min.x + 8.0, card.min.y + HEADER_HEIGHT * 0.5),
            egui::Align2::LEFT_CENTER,
            node.type_label.to_uppercase(),
            egui::FontId::proportional(9.0),
            TYPE_TEXT,
        );

        painter.text(
            egui::pos2(card.min.x + 10.0, card.min.y + HEADER_HEIGHT + 12.0),
            egui::Align2::LEFT_CENTER,
            truncate_title(&node.title),
            egui::FontId::proportional(12.0),
            TITLE_TEXT,
        );

        let edit_color = if self.is_hovering(&node.id, NodeAction::Edit) {
            EDIT_HOVER
        } else {
            ICON_IDLE
        };
        let delete_color = if self.is_hovering(&node.id, NodeAction::Delete) {
            DELETE_HOVER
        } else {
            ICON_IDLE
        };
        painter.text(
            egui::pos2(card.max.x - 35.0, card.min.y + HEADER_HEIGHT * 0.5),
            egui::Align2::CENTER_CENTER,
            "✏",
            egui::FontId::proportional(12.0),
            edit_color,
        );
        painter.text(
            egui::pos2(card.max.x - 18.0, card.min.y + HEADER_HEIGHT * 0.5),
            egui::Align2::CENTER_CENTER,
            "🗑",
            egui::FontId::proportional(12.0),
            delete_color,
        );
    }

    fn is_hovering(&self, id: &EntityId, action: NodeAction) -> bool {
        self.hover
            .as_ref()
            .is_some_and(|h| &h.node_id == id && h.action == action)
    }
}

fn to_vec(pos: egui::Pos2) -> Vec2 {
    Vec2::new(pos.x, pos.y)
}

fn to_pos(v: Vec2) -> egui::Pos2 {
    egui::pos2(v.x, v.y)
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > TITLE_MAX_CHARS {
        let cut: String = title.chars().take(TITLE_MAX_CHARS - 2).collect();
        format!("{cut}...")
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entimap_core::{
        AttrId, Attribute, AttributeKind, Entity, EntityType, TypeId, Value,
    };
    use std::collections::BTreeMap;

    #[test]
    fn short_titles_pass_through_unchanged() {
        assert_eq!(truncate_title("Plan sprint"), "Plan sprint");
        assert_eq!(truncate_title("exactly twenty chars"), "exactly twenty chars");
    }

    #[test]
    fn long_titles_are_cut_with_an_ellipsis() {
        let cut = truncate_title("a title that is much too long for a card");
        assert_eq!(cut, "a title that is mu...");
        assert_eq!(cut.chars().count(), 21);
    }

    #[test]
    fn sync_rebuilds_only_when_the_revision_changes() {
        let data = AppData {
            types: vec![EntityType {
                id: TypeId("t1".into()),
                name: "Task".into(),
                attributes: vec![Attribute {
                    id: AttrId("a1".into()),
                    name: "Title".into(),
                    kind: AttributeKind::Text,
                    target_type_id: None,
                }],
            }],
            entities: vec![Entity {
                id: EntityId("e1".into()),
                type_id: TypeId("t1".into()),
                values: BTreeMap::from([(AttrId("a1".into()), Value::Text("Ship".into()))]),
            }],
        };

        let mut view = MindmapView::new();
        view.sync(&data, 1);
        assert_eq!(view.model.node_count(), 1);
        let spawn = view.model.nodes[0].spawn;

        view.sync(&data, 1);
        assert_eq!(view.model.nodes[0].spawn, spawn);

        view.sync(&data, 2);
        assert_eq!(view.model.node_count(), 1);
    }
}
