//! Fan example queries out to several models and collect the answers into
//! tables, one table per prompt variant.

mod error;
pub use error::*;

pub mod queries;
pub use queries::*;

pub mod runner;
pub use runner::*;

pub mod table;
pub use table::*;

pub mod variants;
pub use variants::*;
