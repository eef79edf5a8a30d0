pub mod keys;
pub mod types;
pub mod validator;

pub use keys::*;
pub use types::*;
pub use validator::*;
