//! # Entity Model
//!
//! Plain DTOs for graph entities and their properties.
//! These types cross every boundary: caller ↔ resolver ↔ formula ↔ formatter.
//!
//! Design rule: pure data with no I/O, state or async.

pub mod entity;
pub mod property;
pub mod value;

pub use entity::{ElementType, Entity};
pub use property::{Metadata, Property, SandboxStatus};
pub use value::Value;
