pub mod conflict;
pub mod contracts;
pub mod geo;
pub mod geocache;
pub mod notify;
pub mod pointage;
pub mod repeat;
pub mod scheduler;
pub mod terminate;
