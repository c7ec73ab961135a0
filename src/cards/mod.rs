/// In-memory card source used as the default backend.
pub mod memory;
/// Card and category data model shared with the REST surface.
pub mod model;
/// Abstraction over the card lookup backend.
pub mod source;
