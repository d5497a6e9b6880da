pub mod alias;
pub mod help;
pub mod history;
