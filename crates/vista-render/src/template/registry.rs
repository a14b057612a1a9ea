//! Template lookup across inline sources and directories.
//!
//! [`TemplateSource`] is what the engine's loader calls for every template
//! name, including names reached through `{% include %}` and
//! `{% extends %}`.
//!
//! # Resolution
//!
//! 1. Inline templates, by exact name, then by name plus extension
//! 2. Directories in search order (first directory wins)
//!
//! # Extensions
//!
//! A name that already has an extension is looked up as-is. Otherwise the
//! configured default extension is appended; with none configured the
//! [`TEMPLATE_EXTENSIONS`] are tried in priority order.
//!
//! # Path Policy
//!
//! Absolute names and names with `..` segments are rejected unless the
//! manager options allow them. See [`check_name`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::RenderError;
use crate::options::ManagerOptions;

/// Recognized template file extensions in priority order.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".jinja", ".jinja2", ".j2", ".html", ".txt"];

/// Checks a template name against the absolute-path and traversal policy.
pub fn check_name(
    name: &str,
    allow_absolute: bool,
    allow_insecure: bool,
) -> Result<(), RenderError> {
    if name.is_empty() {
        return Err(RenderError::InvalidTemplateName(
            "template name is empty".to_string(),
        ));
    }

    let path = Path::new(name);
    if !allow_absolute && (path.is_absolute() || name.starts_with('/')) {
        return Err(RenderError::InvalidTemplateName(format!(
            "absolute template paths are not allowed: {}",
            name
        )));
    }
    if !allow_insecure && path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(RenderError::InvalidTemplateName(format!(
            "template paths must not leave the template directories: {}",
            name
        )));
    }
    Ok(())
}

/// Inline templates plus ordered search directories.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    inline: BTreeMap<String, String>,
    dirs: Vec<PathBuf>,
    default_extension: Option<String>,
    allow_absolute: bool,
    allow_insecure: bool,
}

impl TemplateSource {
    /// Builds the source described by manager options.
    pub fn from_options(options: &ManagerOptions) -> Self {
        Self {
            inline: options.templates.clone(),
            dirs: options.search_dirs(),
            default_extension: options
                .default_extension
                .as_deref()
                .map(|ext| format!(".{}", ext.trim_start_matches('.'))),
            allow_absolute: options.allow_absolute_paths,
            allow_insecure: options.allow_insecure_access,
        }
    }

    /// Applies the path policy configured for this source.
    pub fn check(&self, name: &str) -> Result<(), RenderError> {
        check_name(name, self.allow_absolute, self.allow_insecure)
    }

    /// Names tried for `name`, most specific first.
    pub fn candidates(&self, name: &str) -> Vec<String> {
        let mut names = vec![name.to_string()];
        if Path::new(name).extension().is_some() {
            return names;
        }
        match &self.default_extension {
            Some(ext) => names.push(format!("{}{}", name, ext)),
            None => names.extend(TEMPLATE_EXTENSIONS.iter().map(|ext| format!("{}{}", name, ext))),
        }
        names
    }

    /// Loads the content for `name`, or `None` when no source has it.
    pub fn load(&self, name: &str) -> Result<Option<String>, RenderError> {
        self.check(name)?;
        match self.locate(name) {
            Some((_, Location::Inline(content))) => Ok(Some(content.to_string())),
            Some((_, Location::File(path))) => Ok(Some(fs::read_to_string(path)?)),
            None => Ok(None),
        }
    }

    /// The candidate name `name` actually resolves to, extension included.
    ///
    /// Used to pick the escaping mode for templates requested without an
    /// extension.
    pub fn resolved_name(&self, name: &str) -> Option<String> {
        self.locate(name).map(|(candidate, _)| candidate)
    }

    fn locate(&self, name: &str) -> Option<(String, Location<'_>)> {
        let candidates = self.candidates(name);

        for candidate in &candidates {
            if let Some(content) = self.inline.get(candidate) {
                return Some((candidate.clone(), Location::Inline(content)));
            }
        }

        for candidate in candidates {
            let path = Path::new(&candidate);
            if path.is_absolute() {
                if path.is_file() {
                    let path = path.to_path_buf();
                    return Some((candidate, Location::File(path)));
                }
                continue;
            }
            for dir in &self.dirs {
                let full = dir.join(&candidate);
                if full.is_file() {
                    return Some((candidate, Location::File(full)));
                }
            }
        }

        None
    }
}

enum Location<'a> {
    Inline(&'a str),
    File(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(options: ManagerOptions) -> TemplateSource {
        TemplateSource::from_options(&options)
    }

    #[test]
    fn test_check_name_rejects_absolute() {
        let err = check_name("/etc/passwd", false, false).unwrap_err();
        assert!(matches!(err, RenderError::InvalidTemplateName(_)));
        assert!(check_name("/etc/passwd", true, false).is_ok());
    }

    #[test]
    fn test_check_name_rejects_parent_segments() {
        assert!(check_name("../secret", false, false).is_err());
        assert!(check_name("pages/../../secret", false, false).is_err());
        assert!(check_name("../secret", false, true).is_ok());
    }

    #[test]
    fn test_check_name_rejects_empty() {
        assert!(check_name("", true, true).is_err());
    }

    #[test]
    fn test_candidates_without_default_extension() {
        let src = source(ManagerOptions::new());
        let names = src.candidates("home");
        assert_eq!(names[0], "home");
        assert_eq!(names[1], "home.jinja");
        assert_eq!(names.len(), 1 + TEMPLATE_EXTENSIONS.len());
    }

    #[test]
    fn test_candidates_with_default_extension() {
        let src = source(ManagerOptions::new().with_default_extension("html"));
        assert_eq!(src.candidates("home"), vec!["home", "home.html"]);
    }

    #[test]
    fn test_candidates_keep_explicit_extension() {
        let src = source(ManagerOptions::new().with_default_extension(".html"));
        assert_eq!(src.candidates("home.txt"), vec!["home.txt"]);
    }

    #[test]
    fn test_inline_lookup_with_extension() {
        let src = source(ManagerOptions::new().with_template("home.jinja", "hi"));
        assert_eq!(src.load("home").unwrap(), Some("hi".to_string()));
    }

    #[test]
    fn test_missing_template_is_none() {
        let src = source(ManagerOptions::new().with_path("/nonexistent/views"));
        assert_eq!(src.load("home").unwrap(), None);
    }

    #[test]
    fn test_resolved_name_includes_extension() {
        let src = source(ManagerOptions::new().with_template("page.html", "x"));
        assert_eq!(src.resolved_name("page"), Some("page.html".to_string()));
        assert_eq!(src.resolved_name("other"), None);
    }

    #[test]
    fn test_load_applies_policy() {
        let src = source(ManagerOptions::new().with_template("x", "y"));
        assert!(src.load("../x").is_err());
    }
}
