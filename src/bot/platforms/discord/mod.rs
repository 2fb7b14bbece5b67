pub mod discord;
pub mod event_loop;
