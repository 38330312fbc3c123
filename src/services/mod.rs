// src/services/mod.rs

//! Operations that combine several store calls.

pub mod reactions;
pub mod threads;
