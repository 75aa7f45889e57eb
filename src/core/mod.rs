// src/core/mod.rs — State store, validation and the pipeline engine

pub mod elements;
pub mod orchestrator;
pub mod refinement;
pub mod routing;
pub mod schema;
pub mod stages;
pub mod state;
pub mod types;
