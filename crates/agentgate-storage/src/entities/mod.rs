pub mod api_keys;
pub mod models;
pub mod providers;

pub use api_keys::Entity as ApiKeys;
pub use models::Entity as Models;
pub use providers::Entity as Providers;
