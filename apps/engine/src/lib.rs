//! Career role recommendation engine.
//!
//! The core is `engine::Engine::recommend`: profile in, ranked roles plus
//! skill gap, learning plan, and market trend out. The serve and train
//! binaries are thin shells over this library.

pub mod catalog;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod errors;
pub mod history;
pub mod model;
pub mod plan;
pub mod profile;
pub mod ranker;
pub mod routes;
pub mod sentiment;
pub mod state;
pub mod trend;
