pub mod cards;
pub mod entity_modal;
pub mod mindmap;
pub mod sidebar;
pub mod table;
pub mod type_editor;
