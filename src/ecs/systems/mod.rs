mod raycast;
mod zoning;

pub use raycast::*;
pub use zoning::*;
