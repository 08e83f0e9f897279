pub mod list_state;
pub mod session;
