#[macro_use]
extern crate lazy_static;

pub mod batch;
pub mod chain;
pub mod constants;
pub mod deploy;
pub mod exchange;
pub mod infra;
pub mod simulation;
