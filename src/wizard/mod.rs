pub mod error;
pub mod step_controller;
pub mod submission;
pub mod wizard;
