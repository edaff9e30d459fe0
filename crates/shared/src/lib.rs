//! Wire types shared between the estimation client and its authority.

pub mod domain;
pub mod error;
pub mod events;
pub mod protocol;
