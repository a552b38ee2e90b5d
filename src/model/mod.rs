//! Plain data structures: declarations, stored documents, representations and
//! per-operation options.

pub mod declaration;
pub mod options;
pub mod representation;

pub use declaration::*;
pub use options::*;
pub use representation::*;
