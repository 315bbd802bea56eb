//! Decoding of compressed Metamath proof payloads and layout of proof steps
//! as inference-rule diagrams.
//!
//! The decoder ([`decompress`]) turns a payload into typed proof nodes; the
//! layout engine ([`layout`]) turns one proof node, together with the
//! nodes it depends on, into positioned drawing primitives. Rendering the
//! primitives to a concrete surface is left to the caller.

pub mod config;
pub mod decompress;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod subst;
pub mod types;
pub mod varint;
pub mod view;

pub use config::LayoutConfig;
pub use decompress::{decompress_assertion, decompress_index, Decompressor, RawAssertion};
pub use layout::{layout_step, Diagram, LayoutContext, Primitive, StepLookup};
pub use view::ProofView;
