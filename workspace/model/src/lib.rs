//! SeaORM entities for the hostel marketplace store.

pub mod entities;
