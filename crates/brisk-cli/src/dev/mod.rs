//! Development server.
//!
//! Requests pass through a middleware chain:
//!
//! 1. [`transform_request`]: `/` serves the HTML entry, `.js` modules get
//!    their specifiers rewritten, `.map` files are returned raw and `.vue`
//!    components are compiled.
//! 2. Every other request is served unchanged from the project root.
//! 3. Anything not on disk is a 404.

pub mod context;
pub mod server;
pub mod transform;

pub use context::{DevContext, SharedContext};
pub use server::{DevServer, build_router};
pub use transform::{TransformError, Transformed, transform_request};
