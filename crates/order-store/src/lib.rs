//! Order storage for the order service.
//!
//! The store exclusively owns order rows. Each operation runs as a single scoped transaction;
//! no handle or lock is held once an operation returns.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::{OrderId, PaymentIntentId};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use query::OrderQuery;
pub use store::{OrderStore, PaymentUpdate};
