use eframe::egui;
use entimap_core::{AppData, AttrId, Attribute, AttributeKind, EntityType, TypeId};

const KIND_CHOICES: [AttributeKind; 4] = [
    AttributeKind::Text,
    AttributeKind::Int,
    AttributeKind::Decimal,
    AttributeKind::Link,
];

/// Schema editor: create and rename types, manage their attribute
/// declarations. Edits the document in place and reports whether anything
/// changed so the shell can persist.
#[derive(Default)]
pub struct TypeEditor;

impl TypeEditor {
    pub fn ui(&mut self, ui: &mut egui::Ui, data: &mut AppData) -> bool {
        let mut changed = false;
        let mut remove_type = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            let type_choices: Vec<(TypeId, String)> = data
                .types
                .iter()
                .map(|t| (t.id.clone(), t.name.clone()))
                .collect();

            for (idx, ty) in data.types.iter_mut().enumerate() {
                let header = if ty.name.is_empty() {
                    "(unnamed type)".to_string()
                } else {
                    ty.name.clone()
                };
                egui::CollapsingHeader::new(header)
                    .id_salt(&ty.id.0)
                    .default_open(false)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label("Name:");
                            if ui.text_edit_singleline(&mut ty.name).changed() {
                                changed = true;
                            }
                            if ui.small_button("Delete type").clicked() {
                                remove_type = Some(idx);
                            }
                        });
                        ui.add_space(4.0);
                        changed |= attribute_rows(ui, ty, &type_choices);
                    });
            }

            ui.add_space(8.0);
            if ui.button("Add type").clicked() {
                data.types.push(EntityType {
                    id: TypeId(uuid::Uuid::new_v4().to_string()),
                    name: "New type".to_string(),
                    attributes: vec![Attribute {
                        id: AttrId(uuid::Uuid::new_v4().to_string()),
                        name: "Name".to_string(),
                        kind: AttributeKind::Text,
                        target_type_id: None,
                    }],
                });
                changed = true;
            }
        });

        if let Some(idx) = remove_type {
            let removed = data.types.remove(idx);
            // Entities of the removed type stay in the document; the views
            // show them under the Unknown placeholder.
            tracing::info!(type_id = %removed.id, "type deleted");
            changed = true;
        }

        changed
    }
}

fn attribute_rows(
    ui: &mut egui::Ui,
    ty: &mut EntityType,
    type_choices: &[(TypeId, String)],
) -> bool {
    let mut changed = false;
    let mut remove_attr = None;

    for (idx, attr) in ty.attributes.iter_mut().enumerate() {
        ui.horizontal(|ui| {
            if ui
                .add(egui::TextEdit::singleline(&mut attr.name).desired_width(140.0))
                .changed()
            {
                changed = true;
            }

            egui::ComboBox::from_id_salt(("attr_kind", &attr.id.0))
                .selected_text(attr.kind.as_str())
                .show_ui(ui, |ui| {
                    for kind in KIND_CHOICES {
                        if ui
                            .selectable_value(&mut attr.kind, kind, kind.as_str())
                            .changed()
                        {
                            changed = true;
                        }
                    }
                });

            if attr.kind == AttributeKind::Link {
                let selected_name = attr
                    .target_type_id
                    .as_ref()
                    .and_then(|id| type_choices.iter().find(|(t, _)| t == id))
                    .map(|(_, name)| name.clone())
                    .unwrap_or_else(|| "target…".to_string());
                egui::ComboBox::from_id_salt(("attr_target", &attr.id.0))
                    .selected_text(selected_name)
                    .show_ui(ui, |ui| {
                        for (id, name) in type_choices {
                            if ui
                                .selectable_value(
                                    &mut attr.target_type_id,
                                    Some(id.clone()),
                                    name,
                                )
                                .changed()
                            {
                                changed = true;
                            }
                        }
                    });
            } else if attr.target_type_id.is_some() {
                attr.target_type_id = None;
                changed = true;
            }

            if ui.small_button("✕").on_hover_text("Remove attribute").clicked() {
                remove_attr = Some(idx);
            }
        });
    }

    if let Some(idx) = remove_attr {
        ty.attributes.remove(idx);
        changed = true;
    }

    if ui.small_button("Add attribute").clicked() {
        ty.attributes.push(Attribute {
            id: AttrId(uuid::Uuid::new_v4().to_string()),
            name: String::new(),
            kind: AttributeKind::Text,
            target_type_id: None,
        });
        changed = true;
    }

    changed
}
