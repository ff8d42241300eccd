use crate::app::View;
use eframe::egui;
use entimap_core::{AppData, TypeId};

pub enum SidebarAction {
    ViewSelected(View),
    CreateEntity(TypeId),
}

/// Left panel: view switcher plus a per-type entity census with quick-create
/// buttons.
#[derive(Default)]
pub struct Sidebar;

impl Sidebar {
    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        data: &AppData,
        active: View,
    ) -> Option<SidebarAction> {
        let mut action = None;

        ui.add_space(4.0);
        ui.heading("Entimap");
        ui.separator();

        for view in [View::Cards, View::Table, View::Mindmap, View::Types] {
            if ui.selectable_label(active == view, view.title()).clicked() {
                action = Some(SidebarAction::ViewSelected(view));
            }
        }

        ui.separator();
        ui.label(egui::RichText::new("TYPES").small().weak());
        if data.types.is_empty() {
            ui.label(egui::RichText::new("No types defined yet").weak());
        }
        for ty in &data.types {
            let count = data.entities_of_type(&ty.id).count();
            ui.horizontal(|ui| {
                ui.label(format!("{} ({})", ty.name, count));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .small_button("+")
                        .on_hover_text(format!("New {}", ty.name))
                        .clicked()
                    {
                        action = Some(SidebarAction::CreateEntity(ty.id.clone()));
                    }
                });
            });
        }

        action
    }
}
