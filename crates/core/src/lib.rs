#![forbid(unsafe_code)]

pub mod error;
pub mod identity;
pub mod model;
pub mod stats;
pub mod time;

pub use error::ModelError;
pub use identity::{StaticIdentity, StudentIdentity};
pub use stats::{MasteryLevel, SessionStats};
pub use time::Clock;
