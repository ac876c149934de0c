//! Contract wrappers for the Set Protocol and Butter contracts, plus loading
//! of compiled artifacts for contracts that are deployed from bytecode.

pub mod artifacts;
pub mod wrappers;
