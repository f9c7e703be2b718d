pub mod export;
pub mod schema_gen;
pub mod sqlite;

pub use export::*;
pub use schema_gen::*;
pub use sqlite::*;
