//! SGF game records: validation, parsing, metadata and diagram selection.
//!
//! The two entry points are [`ops::info`] and [`ops::diagram`]. Both are pure per
//! request; the only external capability is the [`render::DiagramRenderer`] the
//! caller supplies for diagrams.

pub mod args;
pub mod error;
pub mod metadata;
pub mod moves;
pub mod ops;
pub mod parser;
pub mod render;
pub mod selector;
pub mod text;
pub mod tree;

pub use error::{ErrorEnvelope, ErrorKind, SgfError};
pub use ops::{diagram, info, load_game, DiagramOutput, InfoOutput, Limits};
pub use render::{DiagramRenderer, RenderError, RenderRequest};
