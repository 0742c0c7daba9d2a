pub mod interface;
pub mod memory;
pub mod postgres;
