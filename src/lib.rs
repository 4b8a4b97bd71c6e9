pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod geometry;
pub mod letters;
pub mod metrics;
pub mod render;
pub mod session;
// cmd and reports belong to the binary (main.rs).
