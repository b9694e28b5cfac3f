pub mod find_dups;
pub mod process;

pub use find_dups::*;
pub use process::*;
