mod console;
mod resolve;
mod schema;
mod validate;

pub use resolve::run_resolve;
pub use schema::run_schema;
pub use validate::run_validate;
