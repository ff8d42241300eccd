use eframe::egui;
use entimap_core::{AppData, AttrId, AttributeKind, EntityId, TypeId, Value};

pub enum TableAction {
    Edit(EntityId),
    Delete(EntityId),
}

#[derive(Default)]
pub struct TableOutcome {
    /// A cell edit was committed; the shell should persist.
    pub changed: bool,
    pub action: Option<TableAction>,
}

/// The cell currently being typed into. Buffering one draft keeps the text
/// cursor stable; the value is parsed and written back when focus leaves.
struct CellDraft {
    entity: EntityId,
    attr: AttrId,
    text: String,
}

/// Spreadsheet-style view of one type's entities: a column per attribute,
/// scalar cells editable inline, link cells picked from a dropdown.
#[derive(Default)]
pub struct TableView {
    selected_type: Option<TypeId>,
    draft: Option<CellDraft>,
}

impl TableView {
    pub fn ui(&mut self, ui: &mut egui::Ui, data: &mut AppData) -> TableOutcome {
        let mut outcome = TableOutcome::default();

        // Keep the selection valid across type deletions.
        if self
            .selected_type
            .as_ref()
            .is_none_or(|id| data.type_by_id(id).is_none())
        {
            self.selected_type = data.types.first().map(|t| t.id.clone());
        }
        let Some(type_id) = self.selected_type.clone() else {
            ui.label(egui::RichText::new("Define a type first").weak());
            return outcome;
        };

        ui.horizontal(|ui| {
            ui.label("Type:");
            egui::ComboBox::from_id_salt("table_type")
                .selected_text(
                    data.type_by_id(&type_id)
                        .map(|t| t.name.clone())
                        .unwrap_or_default(),
                )
                .show_ui(ui, |ui| {
                    for ty in &data.types {
                        ui.selectable_value(&mut self.selected_type, Some(ty.id.clone()), &ty.name);
                    }
                });
        });
        ui.separator();

        let Some(ty) = data.type_by_id(&type_id).cloned() else {
            return outcome;
        };
        let row_ids: Vec<EntityId> = data
            .entities_of_type(&ty.id)
            .map(|e| e.id.clone())
            .collect();

        egui::ScrollArea::both().show(ui, |ui| {
            egui::Grid::new("entity_table")
                .striped(true)
                .min_col_width(80.0)
                .show(ui, |ui| {
                    for attr in &ty.attributes {
                        ui.label(egui::RichText::new(&attr.name).strong());
                    }
                    ui.label("");
                    ui.end_row();

                    for entity_id in &row_ids {
                        for attr in &ty.attributes {
                            match attr.kind {
                                AttributeKind::Link => {
                                    outcome.changed |=
                                        self.link_cell(ui, data, entity_id, attr);
                                }
                                _ => {
                                    outcome.changed |=
                                        self.scalar_cell(ui, data, entity_id, &attr.id);
                                }
                            }
                        }
                        ui.horizontal(|ui| {
                            if ui.small_button("✏").clicked() {
                                outcome.action = Some(TableAction::Edit(entity_id.clone()));
                            }
                            if ui.small_button("🗑").clicked() {
                                outcome.action = Some(TableAction::Delete(entity_id.clone()));
                            }
                        });
                        ui.end_row();
                    }
                });
        });

        outcome
    }

    fn scalar_cell(
        &mut self,
        ui: &mut egui::Ui,
        data: &mut AppData,
        entity_id: &EntityId,
        attr_id: &AttrId,
    ) -> bool {
        let is_active = self
            .draft
            .as_ref()
            .is_some_and(|d| &d.entity == entity_id && &d.attr == attr_id);

        let mut text = if is_active {
            self.draft.as_ref().map(|d| d.text.clone()).unwrap_or_default()
        } else {
            data.entity_by_id(entity_id)
                .and_then(|e| e.value(attr_id))
                .map(|v| v.to_string())
                .unwrap_or_default()
        };

        let resp = ui.add(egui::TextEdit::singleline(&mut text).desired_width(110.0));

        if resp.has_focus() {
            self.draft = Some(CellDraft {
                entity: entity_id.clone(),
                attr: attr_id.clone(),
                text,
            });
            return false;
        }

        if is_active && resp.lost_focus() {
            self.draft = None;
            if let Some(entity) = data.entity_by_id_mut(entity_id) {
                if text.is_empty() {
                    entity.values.remove(attr_id);
                } else {
                    entity.values.insert(attr_id.clone(), Value::parse(&text));
                }
                return true;
            }
        }
        false
    }

    fn link_cell(
        &mut self,
        ui: &mut egui::Ui,
        data: &mut AppData,
        entity_id: &EntityId,
        attr: &entimap_core::Attribute,
    ) -> bool {
        let current = data
            .entity_by_id(entity_id)
            .and_then(|e| e.value(&attr.id))
            .map(|v| v.to_string())
            .unwrap_or_default();
        let shown = if current.is_empty() {
            "(none)".to_string()
        } else {
            data.entity_by_id(&EntityId(current.clone()))
                .map(|e| data.entity_title(e))
                .unwrap_or_else(|| "(missing)".to_string())
        };

        let mut selected = current.clone();
        egui::ComboBox::from_id_salt(("table_link", &entity_id.0, &attr.id.0))
            .selected_text(shown)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut selected, String::new(), "(none)");
                let candidates: Vec<(String, String)> = match &attr.target_type_id {
                    Some(target) => data
                        .entities_of_type(target)
                        .filter(|e| &e.id != entity_id)
                        .map(|e| (e.id.0.clone(), data.entity_title(e)))
                        .collect(),
                    None => Vec::new(),
                };
                for (id, title) in candidates {
                    ui.selectable_value(&mut selected, id, title);
                }
            });

        if selected != current {
            if let Some(entity) = data.entity_by_id_mut(entity_id) {
                if selected.is_empty() {
                    entity.values.remove(&attr.id);
                } else {
                    entity.values.insert(attr.id.clone(), Value::Text(selected));
                }
                return true;
            }
        }
        false
    }
}
