pub mod list;
pub mod start;
pub mod status;
