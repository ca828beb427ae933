pub mod order;
pub mod sync;
pub mod tracking;
