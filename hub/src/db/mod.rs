pub mod collections;
pub mod history;
pub mod indicators;
pub mod pool;
pub mod prices;
