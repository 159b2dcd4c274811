pub mod api;
pub mod config;
pub mod crm;
pub mod main_module;
pub mod pricing;
pub mod shared;
