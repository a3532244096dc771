pub mod aggregator;
pub mod observers;
pub mod store;
