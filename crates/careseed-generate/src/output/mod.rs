pub mod sql;

pub use sql::{WriteMode, write_script};
