pub mod board;
pub mod quote;
pub mod search;
