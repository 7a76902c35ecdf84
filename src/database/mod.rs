pub mod collection;
pub mod manager;
pub mod models;
pub mod registry;
pub mod users;

pub use collection::{Collection, Model, RecordStore};
pub use manager::{DatabaseError, DatabaseManager};
pub use registry::{CollectionRegistry, RegistryError};
pub use users::UserStore;
