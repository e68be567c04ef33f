pub mod background;
pub mod console;
pub mod presenter;
