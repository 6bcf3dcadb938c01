// src/services/mod.rs
pub mod render;
pub mod reply_client;
pub mod transcript;
