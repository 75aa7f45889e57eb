// src/lib.rs — Library root for AeroForge

pub mod backend;
pub mod cli;
pub mod core;
pub mod infra;
