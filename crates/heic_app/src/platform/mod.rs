//! Headless platform layer: CLI intake, effect execution and text rendering.
mod app;
mod cli;
mod effects;
mod logging;
mod render;

pub use app::run_app;
