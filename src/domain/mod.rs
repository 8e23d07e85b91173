pub mod audit;
pub mod errors;
pub mod schema;
pub(crate) mod sync;
