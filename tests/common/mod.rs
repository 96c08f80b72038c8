#![allow(dead_code)] // Each integration crate uses a different subset

pub mod builders;
pub mod strategies;

pub use builders::*;
pub use strategies::*;
