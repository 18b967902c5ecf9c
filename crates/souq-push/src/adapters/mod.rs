pub mod fcm;

pub use fcm::FcmGateway;
