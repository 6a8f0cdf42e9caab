pub mod names;
pub mod time;
