// src/cli/handlers/mod.rs

// One module per command.

pub mod archives;
pub mod commons;
pub mod install;
pub mod list;
pub mod make_default;
pub mod native_image;
pub mod selfupdate;
pub mod setup;
pub mod tray;
pub mod uninstall;
