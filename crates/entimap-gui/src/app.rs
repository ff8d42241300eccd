use eframe::egui;
use entimap_core::{
    AppData, AttrId, Attribute, AttributeKind, Entity, EntityId, EntityType, TypeId, Value,
};
use entimap_storage::XmlStore;
use std::collections::BTreeMap;

use crate::components::{
    cards::{CardsAction, CardsView},
    entity_modal::{EntityModal, ModalAction},
    mindmap::{MindmapAction, MindmapView},
    sidebar::{Sidebar, SidebarAction},
    table::{TableAction, TableView},
    type_editor::TypeEditor,
};
use crate::settings::{AppSettings, LastView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Cards,
    Table,
    Mindmap,
    Types,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Cards => "Cards",
            View::Table => "Table",
            View::Mindmap => "Mindmap",
            View::Types => "Types",
        }
    }
}

impl From<LastView> for View {
    fn from(last: LastView) -> Self {
        match last {
            LastView::Cards => View::Cards,
            LastView::Table => View::Table,
            LastView::Mindmap => View::Mindmap,
            LastView::Types => View::Types,
        }
    }
}

impl From<View> for LastView {
    fn from(view: View) -> Self {
        match view {
            View::Cards => LastView::Cards,
            View::Table => LastView::Table,
            View::Mindmap => LastView::Mindmap,
            View::Types => LastView::Types,
        }
    }
}

pub struct EntimapApp {
    data: AppData,
    store: XmlStore,
    /// Bumped on every document mutation; views cache against it.
    rev: u64,
    view: View,
    settings: AppSettings,

    sidebar: Sidebar,
    cards: CardsView,
    table: TableView,
    type_editor: TypeEditor,
    mindmap: MindmapView,

    modal: Option<EntityModal>,
    confirm_delete: Option<EntityId>,
}

impl EntimapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        cc.egui_ctx.set_zoom_factor(settings.ui_scale);

        let store = XmlStore::open(settings.data_file_path());
        let mut data = match store.load() {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("Failed to load data file: {}", e);
                AppData::default()
            }
        };
        if data.is_empty() {
            data = sample_document();
            if let Err(e) = store.save(&data) {
                tracing::error!("Failed to write starter document: {}", e);
            }
        }
        tracing::info!(
            types = data.types.len(),
            entities = data.entities.len(),
            path = %store.path().display(),
            "document loaded"
        );

        Self {
            data,
            store,
            rev: 0,
            view: settings.last_view.into(),
            settings,
            sidebar: Sidebar,
            cards: CardsView,
            table: TableView::default(),
            type_editor: TypeEditor,
            mindmap: MindmapView::new(),
            modal: None,
            confirm_delete: None,
        }
    }

    fn persist(&mut self) {
        self.rev += 1;
        if let Err(e) = self.store.save(&self.data) {
            tracing::error!("Failed to save data file: {}", e);
        }
    }

    fn switch_view(&mut self, view: View) {
        self.view = view;
        self.settings.last_view = view.into();
        self.settings.save();
    }

    fn open_editor(&mut self, id: EntityId) {
        if let Some(entity) = self.data.entity_by_id(&id) {
            self.modal = Some(EntityModal::edit(&self.data, entity));
        }
    }

    fn show_modal(&mut self, ctx: &egui::Context) {
        let Some(mut modal) = self.modal.take() else {
            return;
        };
        match modal.ui(ctx, &self.data) {
            Some(ModalAction::Save(entity)) => {
                self.data.upsert_entity(entity);
                self.persist();
            }
            Some(ModalAction::Cancel) => {}
            None => self.modal = Some(modal),
        }
    }

    fn show_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(id) = self.confirm_delete.clone() else {
            return;
        };
        let title = self
            .data
            .entity_by_id(&id)
            .map(|e| self.data.entity_title(e))
            .unwrap_or_else(|| entimap_core::UNTITLED_LABEL.to_string());

        egui::Window::new("Delete entity?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!(
                    "\"{}\" will be removed. Links pointing at it disappear from the mindmap.",
                    title
                ));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        self.data.delete_entity(&id);
                        self.persist();
                        self.confirm_delete = None;
                    }
                    if ui.button("Cancel").clicked() {
                        self.confirm_delete = None;
                    }
                });
            });
    }
}

impl eframe::App for EntimapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(self.view.title());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(self.store.path().display().to_string())
                            .small()
                            .weak(),
                    );
                });
            });
        });

        let mut sidebar_action = None;
        egui::SidePanel::left("sidebar")
            .default_width(200.0)
            .show(ctx, |ui| {
                sidebar_action = self.sidebar.ui(ui, &self.data, self.view);
            });
        match sidebar_action {
            Some(SidebarAction::ViewSelected(view)) => self.switch_view(view),
            Some(SidebarAction::CreateEntity(type_id)) => {
                self.modal = Some(EntityModal::create(&self.data, type_id));
            }
            None => {}
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.view {
            View::Cards => match self.cards.ui(ui, &self.data) {
                Some(CardsAction::Edit(id)) => self.open_editor(id),
                Some(CardsAction::Delete(id)) => self.confirm_delete = Some(id),
                None => {}
            },
            View::Table => {
                let outcome = self.table.ui(ui, &mut self.data);
                if outcome.changed {
                    self.persist();
                }
                match outcome.action {
                    Some(TableAction::Edit(id)) => self.open_editor(id),
                    Some(TableAction::Delete(id)) => self.confirm_delete = Some(id),
                    None => {}
                }
            }
            View::Mindmap => {
                self.mindmap.sync(&self.data, self.rev);
                match self.mindmap.ui(ui) {
                    Some(MindmapAction::Edit(id)) => self.open_editor(id),
                    Some(MindmapAction::Delete(id)) => self.confirm_delete = Some(id),
                    None => {}
                }
            }
            View::Types => {
                if self.type_editor.ui(ui, &mut self.data) {
                    self.persist();
                }
            }
        });

        self.show_modal(ctx);
        self.show_delete_confirmation(ctx);
    }
}

/// Starter document written the first time the app runs against an empty
/// store, so every view has something to show.
fn sample_document() -> AppData {
    let task_type = TypeId("type-task".to_string());
    let title = AttrId("attr-title".to_string());
    let priority = AttrId("attr-priority".to_string());
    let blocks = AttrId("attr-blocks".to_string());

    let types = vec![EntityType {
        id: task_type.clone(),
        name: "Task".to_string(),
        attributes: vec![
            Attribute {
                id: title.clone(),
                name: "Title".to_string(),
                kind: AttributeKind::Text,
                target_type_id: None,
            },
            Attribute {
                id: priority.clone(),
                name: "Priority".to_string(),
                kind: AttributeKind::Int,
                target_type_id: None,
            },
            Attribute {
                id: blocks.clone(),
                name: "Blocks".to_string(),
                kind: AttributeKind::Link,
                target_type_id: Some(task_type.clone()),
            },
        ],
    }];

    let entities = vec![
        Entity {
            id: EntityId("task-1".to_string()),
            type_id: task_type.clone(),
            values: BTreeMap::from([
                (title.clone(), Value::Text("Sketch the data model".to_string())),
                (priority.clone(), Value::Number(1.0)),
            ]),
        },
        Entity {
            id: EntityId("task-2".to_string()),
            type_id: task_type,
            values: BTreeMap::from([
                (title, Value::Text("Wire up persistence".to_string())),
                (priority, Value::Number(2.0)),
                (blocks, Value::Text("task-1".to_string())),
            ]),
        },
    ];

    AppData { types, entities }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_document_is_internally_consistent() {
        let data = sample_document();
        assert!(!data.is_empty());
        for entity in &data.entities {
            assert!(data.type_by_id(&entity.type_id).is_some());
        }
        // The link in the starter data resolves.
        let e2 = data.entity_by_id(&EntityId("task-2".into())).unwrap();
        let target = e2.value(&AttrId("attr-blocks".into())).unwrap();
        assert!(data.entity_by_id(&EntityId(target.to_string())).is_some());
    }

    #[test]
    fn view_round_trips_through_the_settings_enum() {
        for view in [View::Cards, View::Table, View::Mindmap, View::Types] {
            assert_eq!(View::from(LastView::from(view)), view);
        }
    }
}
