// Bird Battle Schema - shared ability data definitions
// The engine reads every ability number through these typed records, which are
// deserialized once from a RON table.

pub use abilities::*;
pub use birds::*;
pub use table::*;

pub mod abilities;
pub mod birds;
pub mod table;
