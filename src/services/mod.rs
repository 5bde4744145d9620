pub mod credential;
pub mod document;
pub mod factory;
pub mod policy;
pub mod usage;
