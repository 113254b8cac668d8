//! Domain atoms for the content API client: the typed entity model,
//! the polymorphic node decoder and the per-variant server operations.

pub mod discussion;
pub mod files;
pub mod patho;
pub mod wire;
