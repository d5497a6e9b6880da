pub mod clear;
pub mod echo;
