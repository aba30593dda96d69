pub mod compare;
pub mod solve;
pub mod validate;
