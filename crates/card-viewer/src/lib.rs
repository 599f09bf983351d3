//! Desktop host for the interactive skill card.
//!
//! Wraps a [`cardkit::CardViewer`] in a winit window: cursor and click events
//! go in through [`input::PointerBridge`], textures come off disk through
//! [`assets::FsLoader`], and each composed frame is drawn with wgpu plus an
//! egui overlay for the text labels and HUD.

pub mod app;
pub mod assets;
pub mod camera;
pub mod config;
pub mod input;
pub mod renderer;
pub mod ui;
