// src/foundry/services/mod.rs

pub mod anvil;
pub mod cast;
pub mod chisel;
pub mod docs;
pub mod forge;
pub mod help;
pub mod version;
