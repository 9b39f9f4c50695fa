pub mod a1;
pub mod time;
pub mod token;
