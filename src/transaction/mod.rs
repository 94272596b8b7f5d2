pub mod model;

pub use model::{Transaction, unix_now};
