pub mod annotations;
pub mod api;
pub mod mapping;
pub mod types;
