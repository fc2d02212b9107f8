//! Wire types shared between the admin console core and its front ends.

pub mod domain;
pub mod error;
pub mod protocol;
