//! Generation - manor layout, guest roster and entity spawning

mod guests;
mod manor;
mod roster;

pub use guests::*;
pub use manor::*;
pub use roster::*;
