pub mod fetch;
pub mod format;
pub mod sync;
pub mod tags;
