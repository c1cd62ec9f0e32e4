pub mod logging;
pub mod parsing;
pub mod time;
pub mod validation;
pub mod version;
