pub mod config;
pub mod dataset;
pub mod feature;
pub mod gesture;
pub mod my_types;
pub mod store;
pub mod tracker;
pub mod visualization;
