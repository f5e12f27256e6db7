pub mod list;
pub mod og;
pub mod serve;
pub mod simulate;
