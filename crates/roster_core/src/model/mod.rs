//! Domain model for the institution → course → student hierarchy.
//!
//! # Responsibility
//! - Define read models returned by the stores.
//! - Define listing primitives shared by stores (sort direction, paging).
//!
//! # Invariants
//! - Every entity is identified by a generated UUID that is never reused.
//! - Parent links are UUID references resolved by lookup, never cached.

pub mod course;
pub mod institution;
pub mod listing;
pub mod student;
