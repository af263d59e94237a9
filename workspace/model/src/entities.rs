//! Root of all SeaORM entity modules.
//! One module per table of the hostel marketplace store.

pub mod amenity;
pub mod booking;
pub mod hostel;
pub mod hostel_amenity;
pub mod hostel_media;
pub mod payment;
pub mod review;
pub mod room;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::amenity::Entity as Amenity;
    pub use super::booking::Entity as Booking;
    pub use super::hostel::Entity as Hostel;
    pub use super::hostel_amenity::Entity as HostelAmenity;
    pub use super::hostel_media::Entity as HostelMedia;
    pub use super::payment::Entity as Payment;
    pub use super::review::Entity as Review;
    pub use super::room::Entity as Room;
    pub use super::user::Entity as User;
}
