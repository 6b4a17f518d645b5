// TODO: Re-enable warnings about dead code after the lib is more fully developed.
#![allow(dead_code)]
#![allow(unused_imports)]

mod contracts;
mod management;
#[cfg(feature = "connections")]
mod connections;

pub use contracts::*;
pub use management::*;
#[cfg(feature = "connections")]
pub use connections::*;
