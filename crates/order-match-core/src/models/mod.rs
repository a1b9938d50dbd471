//! Domain models for the order-matching system.

mod catalog;
mod matching;
mod parsed;
mod reference;
mod request;

pub use catalog::*;
pub use matching::*;
pub use parsed::*;
pub use reference::*;
pub use request::*;
