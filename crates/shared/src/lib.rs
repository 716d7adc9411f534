pub mod date;
mod plant;

pub use date::{DateError, DateKey};
pub use plant::*;
