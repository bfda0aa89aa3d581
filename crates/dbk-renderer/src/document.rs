//! Document lifecycle.

use std::fs;
use std::path::{Path, PathBuf};

use dbk_model::{DocModel, NodeId};

use crate::code::CodeMarker;
use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, Severity};
use crate::error::GenerateError;
use crate::resolver::LinkResolver;
use crate::state::RenderState;
use crate::writer::{
    DOCBOOK_NAMESPACE, ElementBalance, XLINK_NAMESPACE, XmlWriter, check_well_formed,
};

/// DocBook version written on the root element.
pub const DOCBOOK_VERSION: &str = "5.2";

/// Read-only collaborators shared by every document of a run.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub model: &'a dyn DocModel,
    pub config: &'a GeneratorConfig,
    pub marker: &'a dyn CodeMarker,
    pub resolver: LinkResolver<'a>,
}

/// Result of rendering one document.
#[derive(Clone, Debug)]
pub struct RenderedDocument {
    /// Node the document was generated for.
    pub node: NodeId,
    /// File name relative to the output directory.
    pub file_name: String,
    /// Complete XML text.
    pub content: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Open/close counts per element.
    pub balance: ElementBalance,
    /// Elements that were still open at the end and had to be closed.
    pub forced_closes: usize,
    /// Image files referenced by the document.
    pub images: Vec<PathBuf>,
}

impl RenderedDocument {
    /// Check that the content is well-formed and write it into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, GenerateError> {
        check_well_formed(&self.content).map_err(|source| GenerateError::Xml {
            file: self.file_name.clone(),
            source,
        })?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.content).map_err(|source| GenerateError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Copy the referenced images into `dir/images`.
    pub fn copy_images(&self, dir: &Path) -> Result<usize, GenerateError> {
        if self.images.is_empty() {
            return Ok(0);
        }
        let images_dir = dir.join("images");
        fs::create_dir_all(&images_dir)?;
        for image in &self.images {
            let Some(file_name) = image.file_name() else {
                continue;
            };
            let target = images_dir.join(file_name);
            fs::copy(image, &target).map_err(|source| GenerateError::Write {
                path: target.clone(),
                source,
            })?;
        }
        Ok(self.images.len())
    }
}

/// An open output document.
///
/// Created by [`Document::open`], which writes the XML declaration and the
/// root `article`. All render state lives here and is dropped by
/// [`Document::close`].
pub struct Document<'a> {
    pub(crate) ctx: RenderContext<'a>,
    pub(crate) node: NodeId,
    pub(crate) writer: XmlWriter,
    pub(crate) state: RenderState,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) images: Vec<PathBuf>,
    file_name: String,
}

impl<'a> Document<'a> {
    /// Open a document for `node` and write the root element.
    pub fn open(ctx: RenderContext<'a>, node: NodeId) -> Self {
        let file_name = ctx.resolver.file_name(node).to_owned();
        tracing::debug!(file = %file_name, "opening document");

        let mut writer = XmlWriter::new();
        writer.start_document();
        writer.newline();
        writer.start_element("article");
        writer.namespace("db", DOCBOOK_NAMESPACE);
        writer.namespace("xlink", XLINK_NAMESPACE);
        writer.attribute("version", DOCBOOK_VERSION);
        let language = if ctx.config.natural_language.is_empty() {
            "en"
        } else {
            ctx.config.natural_language.as_str()
        };
        writer.attribute("xml:lang", language);
        writer.newline();

        Self {
            ctx,
            node,
            writer,
            state: RenderState::default(),
            diagnostics: Vec::new(),
            images: Vec::new(),
            file_name,
        }
    }

    /// Close every open element and return the finished document.
    pub fn close(mut self) -> RenderedDocument {
        let mut forced_closes = self.close_unterminated(&["article", "section"]);
        self.close_text_sections();
        forced_closes += self.close_unterminated(&["article"]);
        self.writer.end_element_named("article");
        if forced_closes > 0 {
            tracing::warn!(
                file = %self.file_name,
                forced_closes,
                "closed unterminated elements at end of document"
            );
        }
        self.writer.newline();

        let (content, balance) = self.writer.finish();
        tracing::debug!(file = %self.file_name, bytes = content.len(), "closed document");
        RenderedDocument {
            node: self.node,
            file_name: self.file_name,
            content,
            diagnostics: self.diagnostics,
            balance,
            forced_closes,
            images: self.images,
        }
    }

    /// Close open elements down to the innermost one named in `keep`,
    /// returning how many were closed.
    fn close_unterminated(&mut self, keep: &[&str]) -> usize {
        let mut closed = 0;
        while self
            .writer
            .current()
            .is_some_and(|name| !keep.contains(&name))
        {
            self.writer.end_element();
            closed += 1;
        }
        closed
    }

    /// Node this document was opened for.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Output written so far.
    pub fn output(&self) -> &str {
        self.writer.as_str()
    }

    /// Anchors registered so far.
    pub fn anchors(&self) -> &crate::anchor::AnchorRegistry {
        &self.state.anchors
    }

    /// Levels of the currently open body sections.
    pub fn open_sections(&self) -> &[i32] {
        self.state.sections.levels()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Report a problem in the documentation of `relative`.
    pub(crate) fn warn(&mut self, relative: NodeId, message: impl Into<String>) {
        self.report(Severity::Warning, relative, message.into());
    }

    /// Report unexpected input in the documentation of `relative`.
    pub(crate) fn error(&mut self, relative: NodeId, message: impl Into<String>) {
        self.report(Severity::Error, relative, message.into());
    }

    fn report(&mut self, severity: Severity, relative: NodeId, message: String) {
        let node = self.ctx.model.node(relative);
        let diagnostic = Diagnostic {
            severity,
            message,
            node: self.ctx.model.qualified_name(relative),
            location: node.location.clone(),
        };
        match severity {
            Severity::Warning => tracing::warn!(node = %diagnostic.node, "{}", diagnostic.message),
            Severity::Error => tracing::error!(node = %diagnostic.node, "{}", diagnostic.message),
        }
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn newline(&mut self) {
        self.writer.newline();
    }

    /// A version prefixed with the project name when it starts with a digit.
    pub(crate) fn format_since(&self, since: &str) -> String {
        let project = &self.ctx.config.project;
        if since.starts_with(|c: char| c.is_ascii_digit()) && !project.is_empty() {
            format!("{project} {since}")
        } else {
            since.to_owned()
        }
    }
}
