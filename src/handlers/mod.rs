// handlers/mod.rs - public (no auth) and protected (JWT) tiers plus system routes

pub mod protected;
pub mod public;
pub mod system;
