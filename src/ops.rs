pub mod freeze;
pub mod into_stream;
pub mod on_complete;
pub mod on_error;
