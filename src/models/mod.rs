pub mod location;
pub mod notify;
pub mod worker;
