pub mod designer;
pub mod not_found;
