pub mod address;
pub mod checks;
pub mod message;

pub use address::*;
pub use checks::*;
pub use message::*;
