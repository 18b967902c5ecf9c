pub mod error;
pub mod message;
pub mod recipient;

pub use error::{CoreError, Result};
pub use message::{DEFAULT_LINK, Message};
pub use recipient::{Order, Recipient, RecipientKind, RecipientRef};
