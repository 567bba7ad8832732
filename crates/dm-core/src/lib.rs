pub mod convert;
pub mod error;
pub mod line;
pub mod member;
pub mod value;

pub use convert::*;
pub use error::BridgeError;
pub use line::*;
pub use member::*;
pub use value::*;
