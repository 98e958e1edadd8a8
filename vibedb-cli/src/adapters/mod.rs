mod process;

pub use process::SysinfoProcessTable;
