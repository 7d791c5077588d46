//! Domain model for condominium charging management.
//!
//! # Responsibility
//! - Define the canonical `Condo` and `User` records shared by every layer.
//! - Own field-level normalization (vehicle type, RFID) and validation.
//!
//! # Invariants
//! - Identity is assigned by storage; `id == None` means "not persisted yet".
//! - A user references its condo by name, never by id.

pub mod condo;
pub mod user;
pub mod validation;
