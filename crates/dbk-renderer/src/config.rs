//! Generator settings.

use std::path::PathBuf;

use dbk_model::NodeKind;

/// Settings shared by every document of one run.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Project name, written as the product name.
    pub project: String,
    /// Project description; see [`description`](Self::description).
    pub description: Option<String>,
    /// Value of `xml:lang` on the root element.
    pub natural_language: String,
    /// Written as the edition of every document.
    pub build_version: Option<String>,
    /// Added to every declared section level; per-kind default when `None`.
    pub heading_offset: Option<i32>,
    /// Emit DocBook synopsis elements for declarations.
    pub use_extensions: bool,
    /// Generate documents for internal nodes.
    pub show_internal: bool,
    /// Directories searched for images.
    pub image_dirs: Vec<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            description: None,
            natural_language: "en".to_owned(),
            build_version: None,
            heading_offset: None,
            use_extensions: true,
            show_internal: false,
            image_dirs: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_build_version(mut self, version: impl Into<String>) -> Self {
        self.build_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_heading_offset(mut self, offset: i32) -> Self {
        self.heading_offset = Some(offset);
        self
    }

    #[must_use]
    pub fn with_extensions(mut self, enabled: bool) -> Self {
        self.use_extensions = enabled;
        self
    }

    #[must_use]
    pub fn with_image_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.image_dirs = dirs;
        self
    }

    /// Description, defaulting to "`project` Reference Documentation".
    pub fn description(&self) -> String {
        match &self.description {
            Some(description) if !description.is_empty() => description.clone(),
            _ => format!("{} Reference Documentation", self.project),
        }
    }

    /// Offset added to section levels in documents of `kind`.
    ///
    /// Reference pages start their sections one level deeper than plain pages
    /// because the member documentation sits at level 2.
    pub fn heading_offset(&self, kind: NodeKind) -> i32 {
        if let Some(offset) = self.heading_offset {
            return offset;
        }
        match kind {
            NodeKind::Namespace
            | NodeKind::Class
            | NodeKind::Struct
            | NodeKind::Union
            | NodeKind::Module => 2,
            NodeKind::QmlModule
            | NodeKind::QmlBasicType
            | NodeKind::QmlType
            | NodeKind::Page
            | NodeKind::Group
            | NodeKind::Example
            | NodeKind::HeaderFile => 1,
            _ => 3,
        }
    }
}
