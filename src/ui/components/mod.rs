pub mod config_modal;
pub mod entry_form;
pub mod history_panel;
