use eframe::egui;
use entimap_core::{AppData, AttributeKind, Entity, EntityId, Value};

const CARD_WIDTH: f32 = 240.0;

pub enum CardsAction {
    Edit(EntityId),
    Delete(EntityId),
}

/// Wrapped grid of entity summary cards, every entity across all types.
#[derive(Default)]
pub struct CardsView;

impl CardsView {
    pub fn ui(&mut self, ui: &mut egui::Ui, data: &AppData) -> Option<CardsAction> {
        let mut action = None;

        if data.entities.is_empty() {
            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("No entities yet").heading().weak());
                ui.label("Use the + buttons in the sidebar to create one.");
            });
            return None;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                for entity in &data.entities {
                    if let Some(a) = self.card(ui, data, entity) {
                        action = Some(a);
                    }
                }
            });
        });

        action
    }

    fn card(
        &self,
        ui: &mut egui::Ui,
        data: &AppData,
        entity: &Entity,
    ) -> Option<CardsAction> {
        let mut action = None;
        ui.group(|ui| {
            ui.set_width(CARD_WIDTH);
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(data.entity_title(entity)).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                            action = Some(CardsAction::Delete(entity.id.clone()));
                        }
                        if ui.small_button("✏").on_hover_text("Edit").clicked() {
                            action = Some(CardsAction::Edit(entity.id.clone()));
                        }
                    });
                });
                ui.label(egui::RichText::new(data.type_label(entity)).small().weak());
                ui.separator();

                if let Some(ty) = data.type_by_id(&entity.type_id) {
                    for attr in &ty.attributes {
                        let Some(value) = entity.value(&attr.id) else {
                            continue;
                        };
                        if value.is_empty() {
                            continue;
                        }
                        let shown = display_value(data, attr.kind, value);
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(format!("{}:", attr.name)).weak());
                            ui.label(shown);
                        });
                    }
                }
            });
        });
        action
    }
}

/// Link values point at entity ids; show the target's title instead.
pub fn display_value(data: &AppData, kind: AttributeKind, value: &Value) -> String {
    if kind == AttributeKind::Link {
        let target = EntityId(value.to_string());
        if let Some(entity) = data.entity_by_id(&target) {
            return data.entity_title(entity);
        }
    }
    value.to_string()
}
