pub mod attendance;
pub mod filter;
pub mod period;
pub mod salary;
pub mod worker;
