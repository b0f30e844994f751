//! Composite item assembly.
//!
//! A composite item is a storage item with its reference ids expanded into
//! `{id, name}` pairs. The coordinator owns the fan-out: it collects the
//! distinct ids of a whole page, resolves them in parallel and joins on
//! all of them before assembling any representation.

mod coordinator;
mod types;

pub use coordinator::CompositeCoordinator;
pub use types::{CompositeItem, CompositeItemPage};
