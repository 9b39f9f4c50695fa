pub mod attendance;
pub mod event;
pub mod location;
pub mod od_form;
