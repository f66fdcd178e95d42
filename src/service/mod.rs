//! Request-level operations. Each function takes the store explicitly and
//! runs to completion within one request.

pub mod archive;
pub mod attendance;
pub mod salary;
pub mod worker;
