//! Business rules of the hostel marketplace.
//!
//! Each service borrows a [`sea_orm::DatabaseConnection`] and owns the
//! transactions it needs; nothing here depends on the HTTP layer.

pub mod authz;
pub mod bookings;
pub mod error;
pub mod hostels;
pub mod media;
pub mod occupancy;
pub mod reviews;
pub mod rooms;
pub mod users;
pub mod verification;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DomainError, Result};
