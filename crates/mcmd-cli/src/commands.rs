pub mod check;
pub mod prepare;
