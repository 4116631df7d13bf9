mod robot;
mod warehouse;

pub use robot::{Path, Robot, Task};
pub use warehouse::Warehouse;
