pub mod display;
pub mod globals;
pub mod list;
pub mod math;
pub mod special_forms;
