pub mod authentication_manager;
pub mod logout_handler;
