pub mod adapters;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod pruner;
pub mod resolver;
pub mod segment;
pub mod service;

pub use adapters::FcmGateway;
pub use config::{GatewayConfig, mask_secrets};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::PushError;
pub use gateway::{DeliveryReport, PlatformOptions, PushData, PushGateway, PushPayload, TokenOutcome};
pub use pruner::TokenPruner;
pub use resolver::{ResolvedToken, ResolvedTokens, Target, TokenResolver};
pub use segment::Segment;
pub use service::{PushService, SendOutcome, TokenCount};
