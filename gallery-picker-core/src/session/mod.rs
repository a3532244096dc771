pub mod capture_manager;
pub mod picker;
pub mod pipeline;
