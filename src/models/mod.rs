pub mod contract;
pub mod point;
pub mod presence;
pub mod task;
pub mod worker;
