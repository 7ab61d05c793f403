//! Action requests exchanged between brains, the resolver and the input path.

mod request;

pub use request::{ActionRequest, Directive, OrderRequest, Transaction, TransactionKind};
