pub mod args;
pub mod collection;
