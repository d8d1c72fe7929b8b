pub mod config;
pub mod error;
pub mod integrity;
pub mod types;
pub mod util;

pub use error::{DiscodeError, Result};
