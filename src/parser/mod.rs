//! Parser module — structural source scanning and static signature
//! reflection.

pub mod php;
pub mod signature;
