pub mod auth;
pub mod bookings;
pub mod health;
pub mod hostels;
pub mod media;
pub mod reviews;
pub mod rooms;
pub mod users;
