pub mod lifecycle;
pub mod reservation;
pub mod sweeper;
