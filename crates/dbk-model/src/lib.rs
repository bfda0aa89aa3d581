//! Documentation model for the DocBook generator.
//!
//! A model is a tree of [`Node`]s. Each node carries a parsed comment
//! ([`Doc`]) whose body and brief are flat [`Text`] sequences of [`Atom`]s.
//!
//! The generator only reads the model through the [`DocModel`] trait.
//! [`DocTree`] is an in-memory implementation that can be built in code or
//! loaded from JSON:
//!
//! ```
//! use dbk_model::{DocModel, DocTree, Node, NodeKind};
//!
//! let mut tree = DocTree::new();
//! let class = tree.add(tree.root(), Node::new(NodeKind::Class, "Widget"));
//! assert_eq!(tree.find_node("Widget", Some(NodeKind::Class)), Some(class));
//! ```

mod atom;
mod error;
mod model;
mod node;
mod text;
mod tree;

pub use atom::{Atom, AtomKind, formatting, list};
pub use error::ModelError;
pub use model::{DocModel, TargetMatch};
pub use node::{
    Access, ClassInfo, CollectionInfo, Doc, EnumInfo, EnumItem, FunctionInfo, Location, Metaness,
    NavLink, Navigation, Node, NodeDetails, NodeId, NodeKind, Parameter, PropertyInfo,
    QmlTypeInfo, SharedCommentInfo, Status, ThreadSafeness, TypedefInfo, VariableInfo, Virtualness,
};
pub use text::Text;
pub use tree::DocTree;
