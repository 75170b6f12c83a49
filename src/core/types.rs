//! Core type aliases and re-exports

pub use glam::{
    Vec2, Vec3, Vec4,
    Quat,
    IVec3, UVec3,
};

/// Standard Result type for the painter
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;
