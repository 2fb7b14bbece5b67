pub mod lifecycle;
pub mod maintenance;
