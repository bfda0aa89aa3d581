//! DocBook 5.2 generator for the documentation model.
//!
//! The generator turns the [`Text`](dbk_model::Text) atom streams and nodes
//! of a [`DocModel`](dbk_model::DocModel) into one DocBook `article` per page.
//!
//! # Architecture
//!
//! - [`Document`]: one open output file. It owns the [`XmlWriter`] and all
//!   per-document render state, so nothing leaks from one page to the next.
//! - The atom interpreter walks a text and dispatches to the list, table and
//!   section state machines, skipping conditional blocks for other formats.
//! - [`LinkResolver`]: file names, member anchors and link targets.
//! - [`DocBookGenerator`]: lays out pages per node kind and walks the model.
//!
//! Rendering never fails. Problems in the input are collected as
//! [`Diagnostic`]s on the [`RenderedDocument`] and the output degrades to
//! plain text.
//!
//! # Example
//!
//! ```
//! use dbk_model::{DocModel, DocTree, Node, NodeKind, Text};
//! use dbk_renderer::{DocBookGenerator, GeneratorConfig};
//!
//! let mut tree = DocTree::new();
//! tree.add(
//!     tree.root(),
//!     Node::new(NodeKind::Page, "intro.html").with_body(Text::plain("Hello")),
//! );
//! let config = GeneratorConfig::new("Acme");
//! let documents = DocBookGenerator::new(&tree, &config).generate_documentation();
//! assert_eq!(documents[0].file_name, "intro.xml");
//! ```

mod anchor;
mod code;
mod config;
mod db_synopsis;
mod diagnostics;
mod document;
mod error;
mod generated;
mod generator;
mod interpreter;
mod lists;
mod members;
mod page;
mod resolver;
mod sections;
mod state;
mod synopsis;
mod tables;
mod writer;

pub use anchor::{AnchorRegistry, canonical_title};
pub use code::{CodeMarker, PlainCodeMarker};
pub use config::GeneratorConfig;
pub use diagnostics::{Diagnostic, Severity};
pub use document::{DOCBOOK_VERSION, Document, RenderContext, RenderedDocument};
pub use error::GenerateError;
pub use generator::DocBookGenerator;
pub use interpreter::{AtomListOutcome, FORMAT};
pub use resolver::{FILE_EXTENSION, LinkResolver, ResolvedLink};
pub use sections::SectionStack;
pub use synopsis::SynopsisStyle;
pub use writer::{
    DOCBOOK_NAMESPACE, ElementBalance, XLINK_NAMESPACE, XmlWriter, check_well_formed,
};
