use eframe::egui;
use entimap_core::{
    AppData, AttrId, AttributeKind, Entity, EntityId, TypeId, Value,
};
use std::collections::BTreeMap;

pub enum ModalAction {
    Save(Entity),
    Cancel,
}

struct FieldDraft {
    attr_id: AttrId,
    label: String,
    kind: AttributeKind,
    target_type_id: Option<TypeId>,
    /// Text buffer for scalar fields; selected entity id for link fields.
    text: String,
}

/// Modal window for creating or editing one entity. Drafts are buffered
/// locally; nothing touches the document until Save.
pub struct EntityModal {
    entity_id: EntityId,
    type_id: TypeId,
    is_new: bool,
    fields: Vec<FieldDraft>,
}

impl EntityModal {
    pub fn create(data: &AppData, type_id: TypeId) -> Self {
        let fields = drafts_for_type(data, &type_id, None);
        Self {
            entity_id: EntityId(uuid::Uuid::new_v4().to_string()),
            type_id,
            is_new: true,
            fields,
        }
    }

    pub fn edit(data: &AppData, entity: &Entity) -> Self {
        let fields = drafts_for_type(data, &entity.type_id, Some(entity));
        Self {
            entity_id: entity.id.clone(),
            type_id: entity.type_id.clone(),
            is_new: false,
            fields,
        }
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn ui(&mut self, ctx: &egui::Context, data: &AppData) -> Option<ModalAction> {
        let mut action = None;
        let title = if self.is_new {
            format!("New {}", type_name(data, &self.type_id))
        } else {
            format!("Edit {}", type_name(data, &self.type_id))
        };

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                egui::Grid::new("entity_modal_fields")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        for field in &mut self.fields {
                            ui.label(&field.label);
                            match field.kind {
                                AttributeKind::Link => {
                                    link_picker(ui, data, field, &self.entity_id);
                                }
                                _ => {
                                    ui.add(
                                        egui::TextEdit::singleline(&mut field.text)
                                            .desired_width(220.0),
                                    );
                                }
                            }
                            ui.end_row();
                        }
                    });

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        action = Some(ModalAction::Save(self.build_entity()));
                    }
                    if ui.button("Cancel").clicked() {
                        action = Some(ModalAction::Cancel);
                    }
                });
            });

        action
    }

    fn build_entity(&self) -> Entity {
        let mut values = BTreeMap::new();
        for field in &self.fields {
            if field.text.is_empty() {
                continue;
            }
            let value = match field.kind {
                // Link buffers hold the target id verbatim.
                AttributeKind::Link => Value::Text(field.text.clone()),
                _ => Value::parse(&field.text),
            };
            values.insert(field.attr_id.clone(), value);
        }
        Entity {
            id: self.entity_id.clone(),
            type_id: self.type_id.clone(),
            values,
        }
    }
}

fn drafts_for_type(data: &AppData, type_id: &TypeId, entity: Option<&Entity>) -> Vec<FieldDraft> {
    let Some(ty) = data.type_by_id(type_id) else {
        return Vec::new();
    };
    ty.attributes
        .iter()
        .map(|attr| {
            let text = entity
                .and_then(|e| e.value(&attr.id))
                .map(|v| v.to_string())
                .unwrap_or_default();
            FieldDraft {
                attr_id: attr.id.clone(),
                label: attr.name.clone(),
                kind: attr.kind,
                target_type_id: attr.target_type_id.clone(),
                text,
            }
        })
        .collect()
}

fn link_picker(ui: &mut egui::Ui, data: &AppData, field: &mut FieldDraft, own_id: &EntityId) {
    let selected = if field.text.is_empty() {
        "(none)".to_string()
    } else {
        data.entity_by_id(&EntityId(field.text.clone()))
            .map(|e| data.entity_title(e))
            .unwrap_or_else(|| "(missing)".to_string())
    };

    egui::ComboBox::from_id_salt(("link_field", &field.attr_id.0))
        .selected_text(selected)
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut field.text, String::new(), "(none)");
            for entity in link_candidates(data, field.target_type_id.as_ref(), own_id) {
                ui.selectable_value(
                    &mut field.text,
                    entity.id.0.clone(),
                    data.entity_title(entity),
                );
            }
        });
}

/// Entities offered by a link dropdown: the target type's entities minus
/// the record being edited. A link attribute without a target type offers
/// nothing.
fn link_candidates<'a>(
    data: &'a AppData,
    target: Option<&TypeId>,
    own_id: &EntityId,
) -> Vec<&'a Entity> {
    match target {
        Some(target) => data
            .entities_of_type(target)
            .filter(|e| &e.id != own_id)
            .collect(),
        None => Vec::new(),
    }
}

fn type_name(data: &AppData, type_id: &TypeId) -> String {
    data.type_by_id(type_id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| entimap_core::UNKNOWN_TYPE_LABEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use entimap_core::{Attribute, EntityType};

    fn data() -> AppData {
        AppData {
            types: vec![EntityType {
                id: TypeId("t1".into()),
                name: "Task".into(),
                attributes: vec![
                    Attribute {
                        id: AttrId("a1".into()),
                        name: "Title".into(),
                        kind: AttributeKind::Text,
                        target_type_id: None,
                    },
                    Attribute {
                        id: AttrId("a2".into()),
                        name: "Priority".into(),
                        kind: AttributeKind::Int,
                        target_type_id: None,
                    },
                ],
            }],
            entities: vec![],
        }
    }

    #[test]
    fn create_buffers_one_field_per_declared_attribute() {
        let modal = EntityModal::create(&data(), TypeId("t1".into()));
        assert!(modal.is_new);
        assert_eq!(modal.fields.len(), 2);
        assert!(modal.fields.iter().all(|f| f.text.is_empty()));
    }

    #[test]
    fn build_entity_skips_empty_fields_and_parses_numbers() {
        let mut modal = EntityModal::create(&data(), TypeId("t1".into()));
        modal.fields[1].text = "3".into();
        let entity = modal.build_entity();
        assert_eq!(entity.values.len(), 1);
        assert_eq!(entity.value(&AttrId("a2".into())), Some(&Value::Number(3.0)));
    }

    fn task(id: &str, title: &str) -> Entity {
        Entity {
            id: EntityId(id.into()),
            type_id: TypeId("t1".into()),
            values: BTreeMap::from([(AttrId("a1".into()), Value::Text(title.into()))]),
        }
    }

    #[test]
    fn link_candidates_never_offer_the_entity_itself() {
        let mut d = data();
        d.entities.push(task("e1", "Ship"));
        d.entities.push(task("e2", "Plan"));

        let candidates = link_candidates(&d, Some(&TypeId("t1".into())), &EntityId("e1".into()));
        let ids: Vec<&EntityId> = candidates.iter().map(|e| &e.id).collect();
        assert_eq!(ids, vec![&EntityId("e2".into())]);
    }

    #[test]
    fn link_without_a_target_type_offers_nothing() {
        let mut d = data();
        d.entities.push(task("e1", "Ship"));
        d.entities.push(task("e2", "Plan"));

        assert!(link_candidates(&d, None, &EntityId("e1".into())).is_empty());
    }

    #[test]
    fn edit_prefills_drafts_from_values() {
        let mut d = data();
        d.entities.push(Entity {
            id: EntityId("e1".into()),
            type_id: TypeId("t1".into()),
            values: BTreeMap::from([(AttrId("a1".into()), Value::Text("Ship".into()))]),
        });
        let modal = EntityModal::edit(&d, &d.entities[0]);
        assert!(!modal.is_new);
        assert_eq!(modal.fields[0].text, "Ship");
        assert_eq!(modal.entity_id(), &EntityId("e1".into()));
    }
}
