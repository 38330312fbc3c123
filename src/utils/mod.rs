// src/utils/mod.rs

pub mod html;
pub mod session;
pub mod slug;
pub mod thread;
