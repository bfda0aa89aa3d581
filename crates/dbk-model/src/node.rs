//! Documentation nodes.

use std::cell::OnceCell;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text::Text;

/// Index of a node inside its model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// What a node documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Namespace,
    Class,
    Struct,
    Union,
    HeaderFile,
    Page,
    ExternalPage,
    Example,
    Group,
    Module,
    QmlModule,
    QmlType,
    QmlBasicType,
    Enum,
    Typedef,
    TypeAlias,
    Function,
    Property,
    Variable,
    QmlProperty,
    QmlSignal,
    QmlSignalHandler,
    QmlMethod,
    SharedComment,
}

impl NodeKind {
    /// Word used in generated sentences ("This class is obsolete.").
    pub fn type_word(self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::HeaderFile => "header",
            Self::Page | Self::ExternalPage => "page",
            Self::Example => "example",
            Self::Group => "group",
            Self::Module => "module",
            Self::QmlModule => "QML module",
            Self::QmlType => "QML type",
            Self::QmlBasicType => "QML basic type",
            Self::Enum => "enum",
            Self::Typedef | Self::TypeAlias => "typedef",
            Self::Function | Self::SharedComment => "function",
            Self::Property | Self::QmlProperty => "property",
            Self::Variable => "variable",
            Self::QmlSignal => "signal",
            Self::QmlSignalHandler => "signal handler",
            Self::QmlMethod => "method",
        }
    }

    /// Classes, structs, unions, namespaces and header files.
    pub fn is_aggregate(self) -> bool {
        matches!(
            self,
            Self::Namespace | Self::Class | Self::Struct | Self::Union | Self::HeaderFile
        )
    }

    pub fn is_class_like(self) -> bool {
        matches!(self, Self::Class | Self::Struct | Self::Union)
    }

    /// Groups, modules and QML modules.
    pub fn is_collection(self) -> bool {
        matches!(self, Self::Group | Self::Module | Self::QmlModule)
    }

    pub fn is_qml_type(self) -> bool {
        matches!(self, Self::QmlType | Self::QmlBasicType)
    }

    /// Nodes that get their own output document.
    pub fn is_page_like(self) -> bool {
        self.is_aggregate()
            || self.is_collection()
            || self.is_qml_type()
            || matches!(self, Self::Page | Self::Example)
    }

    /// Nodes rendered with a function-style signature.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            Self::Function | Self::QmlSignal | Self::QmlSignalHandler | Self::QmlMethod
        )
    }

    /// Nodes that can be the target of a type reference.
    pub fn is_type(self) -> bool {
        self.is_class_like()
            || self.is_qml_type()
            || matches!(self, Self::Enum | Self::Typedef | Self::TypeAlias | Self::Namespace)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Preliminary,
    Deprecated,
    Obsolete,
    Internal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreadSafeness {
    #[default]
    Unspecified,
    NonReentrant,
    Reentrant,
    ThreadSafe,
}

/// Source position of a documentation comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    #[serde(default)]
    pub line: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Parsed documentation comment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Doc {
    pub body: Text,
    pub brief: Text,
    /// "See also" entries, one text per entry.
    pub also: Vec<Text>,
    /// Anchor names declared with `\target`.
    pub targets: Vec<String>,
    pub maintainers: Vec<String>,
}

/// A navigation entry in the document header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub target: String,
    pub title: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Navigation {
    pub previous: Option<NavLink>,
    pub next: Option<NavLink>,
    pub start: Option<NavLink>,
}

impl Navigation {
    pub fn is_empty(&self) -> bool {
        self.previous.is_none() && self.next.is_none() && self.start.is_none()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Virtualness {
    #[default]
    NonVirtual,
    Virtual,
    PureVirtual,
}

/// Role of a function in its class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metaness {
    #[default]
    Plain,
    Signal,
    Slot,
    Ctor,
    CopyCtor,
    MoveCtor,
    Dtor,
    CopyAssign,
    MoveAssign,
    MacroWithParams,
    MacroWithoutParams,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub data_type: String,
    pub name: String,
    pub default_value: String,
}

impl Parameter {
    pub fn new(data_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            name: name.into(),
            default_value: String::new(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FunctionInfo {
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub virtualness: Virtualness,
    pub metaness: Metaness,
    pub is_const: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub is_override: bool,
    /// `&` ref-qualifier.
    pub is_ref: bool,
    /// `&&` ref-qualifier.
    pub is_rvalue_ref: bool,
    pub is_invokable: bool,
    pub is_private_signal: bool,
    pub is_default: bool,
    pub is_deleted: bool,
    /// Qualified name of the function this one reimplements.
    pub reimplements: Option<String>,
    pub overload_number: u32,
}

impl FunctionInfo {
    pub fn is_special_member(&self) -> bool {
        matches!(
            self.metaness,
            Metaness::Ctor
                | Metaness::CopyCtor
                | Metaness::MoveCtor
                | Metaness::Dtor
                | Metaness::CopyAssign
                | Metaness::MoveAssign
        )
    }

    pub fn is_macro(&self) -> bool {
        matches!(
            self.metaness,
            Metaness::MacroWithParams | Metaness::MacroWithoutParams
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumItem {
    pub name: String,
    pub value: String,
    pub since: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumInfo {
    pub items: Vec<EnumItem>,
    pub is_scoped: bool,
    /// Typedef declaring the `QFlags` type for this enum.
    pub flags: Option<NodeId>,
}

impl EnumInfo {
    /// Literal value recorded for the enumerator `name`.
    pub fn item_value(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.value.as_str())
            .filter(|value| !value.is_empty())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PropertyInfo {
    pub data_type: String,
    pub getters: Vec<String>,
    pub setters: Vec<String>,
    pub resetters: Vec<String>,
    pub notifiers: Vec<String>,
    pub is_read_only: bool,
    pub is_default: bool,
    pub is_required: bool,
    pub is_attached: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableInfo {
    pub left_type: String,
    pub right_type: String,
    pub is_static: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypedefInfo {
    /// Right-hand side of a `using` alias.
    pub aliased_type: Option<String>,
    /// Enum whose values this flags typedef combines.
    pub associated_enum: Option<NodeId>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassInfo {
    pub include_file: Option<String>,
    /// Qualified names of the direct base classes.
    pub bases: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QmlTypeInfo {
    /// QML module to import, e.g. `QtQuick 2.15`.
    pub import: Option<String>,
    pub base: Option<String>,
    /// C++ class instantiated by this type.
    pub instantiates: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionInfo {
    pub members: Vec<NodeId>,
    /// Referenced with `\ingroup` but never documented itself.
    pub undocumented: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedCommentInfo {
    /// Functions documented together by one comment.
    pub collective: Vec<NodeId>,
}

/// Kind-specific data.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeDetails {
    #[default]
    None,
    Function(FunctionInfo),
    Enum(EnumInfo),
    Property(PropertyInfo),
    Variable(VariableInfo),
    Typedef(TypedefInfo),
    Class(ClassInfo),
    QmlType(QmlTypeInfo),
    Collection(CollectionInfo),
    SharedComment(SharedCommentInfo),
}

/// One entity of the documentation model.
///
/// Nodes are read-only while rendering, apart from the memoized output file
/// name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub access: Access,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub doc: Doc,
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub thread_safeness: ThreadSafeness,
    /// Page title; derived from the name when absent.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Address of an external page.
    #[serde(default)]
    pub url: Option<String>,
    /// Module the node belongs to.
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub navigation: Navigation,
    #[serde(default)]
    pub details: NodeDetails,
    #[serde(skip)]
    output_file: OnceCell<String>,
}

impl Node {
    /// Create a node with default status, access and no documentation.
    #[must_use]
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            status: Status::default(),
            access: Access::default(),
            parent: None,
            children: Vec::new(),
            doc: Doc::default(),
            since: None,
            thread_safeness: ThreadSafeness::default(),
            title: None,
            subtitle: None,
            url: None,
            module: None,
            location: None,
            navigation: Navigation::default(),
            details: NodeDetails::None,
            output_file: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Text) -> Self {
        self.doc.body = body;
        self
    }

    #[must_use]
    pub fn with_brief(mut self, brief: Text) -> Self {
        self.doc.brief = brief;
        self
    }

    #[must_use]
    pub fn with_also(mut self, also: Vec<Text>) -> Self {
        self.doc.also = also;
        self
    }

    #[must_use]
    pub fn with_since(mut self, since: impl Into<String>) -> Self {
        self.since = Some(since.into());
        self
    }

    #[must_use]
    pub fn with_thread_safeness(mut self, thread_safeness: ThreadSafeness) -> Self {
        self.thread_safeness = thread_safeness;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = Some(Location {
            file: file.into(),
            line,
        });
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: NodeDetails) -> Self {
        self.details = details;
        self
    }

    pub fn is_obsolete(&self) -> bool {
        self.status == Status::Obsolete
    }

    pub fn is_internal(&self) -> bool {
        self.status == Status::Internal
    }

    pub fn has_doc(&self) -> bool {
        !self.doc.body.is_empty() || !self.doc.brief.is_empty()
    }

    /// Title for page-like nodes, falling back to the name.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Output file name, computed once by `compute` and cached.
    pub fn output_file(&self, compute: impl FnOnce() -> String) -> &str {
        self.output_file.get_or_init(compute)
    }

    pub fn function(&self) -> Option<&FunctionInfo> {
        match &self.details {
            NodeDetails::Function(info) => Some(info),
            _ => None,
        }
    }

    pub fn enumeration(&self) -> Option<&EnumInfo> {
        match &self.details {
            NodeDetails::Enum(info) => Some(info),
            _ => None,
        }
    }

    pub fn property(&self) -> Option<&PropertyInfo> {
        match &self.details {
            NodeDetails::Property(info) => Some(info),
            _ => None,
        }
    }

    pub fn variable(&self) -> Option<&VariableInfo> {
        match &self.details {
            NodeDetails::Variable(info) => Some(info),
            _ => None,
        }
    }

    pub fn typedef(&self) -> Option<&TypedefInfo> {
        match &self.details {
            NodeDetails::Typedef(info) => Some(info),
            _ => None,
        }
    }

    pub fn class(&self) -> Option<&ClassInfo> {
        match &self.details {
            NodeDetails::Class(info) => Some(info),
            _ => None,
        }
    }

    pub fn qml_type(&self) -> Option<&QmlTypeInfo> {
        match &self.details {
            NodeDetails::QmlType(info) => Some(info),
            _ => None,
        }
    }

    pub fn collection(&self) -> Option<&CollectionInfo> {
        match &self.details {
            NodeDetails::Collection(info) => Some(info),
            _ => None,
        }
    }

    pub fn shared_comment(&self) -> Option<&SharedCommentInfo> {
        match &self.details {
            NodeDetails::SharedComment(info) => Some(info),
            _ => None,
        }
    }
}
