//! HTTP Routes

pub mod recommendations;
pub mod sensors;
pub mod stages;
