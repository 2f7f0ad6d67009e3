//! The stage/task synchronization engine.
//!
//! [`BoardState`] owns the ordered stage list and is the only code that
//! writes stage records to a [`PersistenceStore`](crate::store::PersistenceStore).

pub mod error;
pub mod state;
pub mod validate;

pub use error::{BoardError, BoardResult, ErrorKind};
pub use state::{read_stages, BoardState};
