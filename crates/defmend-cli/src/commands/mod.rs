pub mod fix_file;
pub mod inventory;
pub mod process;
