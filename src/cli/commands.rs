pub mod grant_admin;
pub mod initdb;
pub mod serve;

pub use grant_admin::grant_admin;
pub use initdb::init_database;
pub use serve::serve;
