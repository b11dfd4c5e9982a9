pub mod branch;
pub mod change;
pub mod commit;
pub mod report;
pub mod window;
