pub mod client;
pub mod poller;
pub mod validate;
pub mod verdict;
