pub mod clamp;
pub mod color;
pub mod gradient;
pub mod scale;
