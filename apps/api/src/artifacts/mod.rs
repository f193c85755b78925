// Resume artifact resolution and delivery.
// Locator (pure) → backend readers (object store / local files) → render-on-miss for local PDFs.

pub mod handlers;
pub mod local;
pub mod locator;
pub mod object_store;
pub mod reader;
pub mod resolver;

#[cfg(test)]
pub mod testing;

pub use locator::{ArtifactFormat, ArtifactLocator};
pub use resolver::ArtifactResolver;
