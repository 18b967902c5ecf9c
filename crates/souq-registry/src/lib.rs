pub mod error;
pub mod traits;

pub use error::RegistryError;
pub use traits::RecipientRegistry;
