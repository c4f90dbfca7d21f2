pub mod force_graph;
pub mod merge_dialog;
pub mod notification;
pub mod panel;
pub mod sidebar;
pub mod toolbar;
