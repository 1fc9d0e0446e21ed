pub mod ident;
pub mod store;
pub mod value;

pub use ident::{quote_ident, quote_qualified};
pub use store::PostgresStore;
