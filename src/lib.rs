pub mod app;
pub mod autostart;
pub mod config;
pub mod core;
pub mod input;
pub mod model;
pub mod playback;
pub mod settings;
pub mod telemetry;
pub mod ui;
pub mod window;
