pub mod contexts;
pub mod data;
pub mod mode_detection;
pub mod name_cleaner;
