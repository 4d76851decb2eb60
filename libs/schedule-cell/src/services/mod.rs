pub mod resolver;
pub mod schedule;
pub mod slots;
