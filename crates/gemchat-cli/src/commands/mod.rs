pub mod conversation;
pub mod send;
