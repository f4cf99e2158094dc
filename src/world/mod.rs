//! Persisted formats: the `.nklvl` level file and the save data file

mod nkdata;
mod nklvl;

pub use nkdata::*;
pub use nklvl::*;
