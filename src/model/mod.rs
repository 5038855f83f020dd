//! Structural model of an API: classes, their members, modifiers and annotations

mod annotation;
mod class;
mod member;
mod modifiers;
pub mod names;

pub use annotation::*;
pub use class::*;
pub use member::*;
pub use modifiers::*;
