pub mod host;
pub mod html;
pub mod parse;
