// src/handlers/mod.rs

pub mod article;
pub mod comment;
pub mod health;
pub mod interaction;
