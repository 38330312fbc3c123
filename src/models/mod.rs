// src/models/mod.rs

pub mod article;
pub mod comment;
pub mod interaction;
