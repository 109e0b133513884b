pub mod cache;
pub mod engine;
pub mod handlers;
pub mod normalize;
pub mod orchestrator;
