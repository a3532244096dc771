pub mod asset_resolver;
pub mod capture_delegate;
pub mod capture_hardware;
pub mod persistence_writer;
pub mod picker_delegate;
pub mod selection_observer;
