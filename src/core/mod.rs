// src/core/mod.rs

pub mod busy;
pub mod catalog;
pub mod config_loader;
pub mod indicator;
pub mod menu;
pub mod paths;
pub mod serializer;
pub mod tray_controller;
pub mod version_state;
pub mod view_lists;
