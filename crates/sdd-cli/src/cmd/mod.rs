pub mod spec;
pub mod sync;
