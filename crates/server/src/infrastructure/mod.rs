// Adapters behind the repository ports.

pub mod memory;
pub mod notion;
