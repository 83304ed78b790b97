pub mod block;
pub mod container;
pub mod crypto;
pub mod error;
pub mod keygen;
pub mod pipeline;
pub mod select;
pub mod session;

pub use error::{Error, Result};
pub use session::{EncryptOptions, Session, Status};
