//! Turn sequencing on top of `furysweep-core`: the phase machine, its
//! cancellable clock and the opponent's decision policies.

pub use clock::*;
pub use config::*;
pub use error::*;
pub use machine::*;
pub use phase::*;
pub use policy::*;

mod clock;
mod config;
mod error;
mod machine;
mod phase;
mod policy;
