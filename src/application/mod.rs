pub mod app;
pub mod cli;
pub mod entry_form;
pub mod history;
pub mod input;
pub mod project_selector;
pub mod timesheet;
