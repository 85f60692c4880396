//! Template trees consumed by the scaffolder

use std::io;
use std::path::{Path, PathBuf};

use pharos_core::{Error, Result};
use rust_embed::Embed;

/// A set of named templates: directory trees and single files
pub trait TemplateSource {
    /// Check if a template with this name exists
    fn has(&self, name: &str) -> bool;

    /// Copy the contents of a template tree into `dest`, returning the number of files
    fn copy_tree(&self, name: &str, dest: &Path) -> Result<usize>;

    /// Copy a single template file to `dest`
    fn copy_file(&self, name: &str, dest: &Path) -> Result<()>;
}

fn fs_extra_error(e: fs_extra::error::Error) -> Error {
    Error::FileSystem(io::Error::other(e.to_string()))
}

// =============================================================================
// Bundled Implementation
// =============================================================================

#[derive(Embed)]
#[folder = "templates/"]
struct Bundled;

/// Templates compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTemplates;

impl EmbeddedTemplates {
    fn prefix(name: &str) -> String {
        format!("{}/", name.trim_end_matches('/'))
    }
}

impl TemplateSource for EmbeddedTemplates {
    fn has(&self, name: &str) -> bool {
        let prefix = Self::prefix(name);
        Bundled::get(name).is_some() || Bundled::iter().any(|path| path.starts_with(&prefix))
    }

    fn copy_tree(&self, name: &str, dest: &Path) -> Result<usize> {
        let prefix = Self::prefix(name);
        let mut copied = 0;

        for path in Bundled::iter() {
            let Some(relative) = path.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let file = Bundled::get(&path)
                .ok_or_else(|| Error::TemplateNotFound(path.to_string()))?;
            let target = dest.join(relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, file.data.as_ref())?;
            copied += 1;
        }

        if copied == 0 {
            return Err(Error::TemplateNotFound(name.to_string()));
        }
        Ok(copied)
    }

    fn copy_file(&self, name: &str, dest: &Path) -> Result<()> {
        let file = Bundled::get(name).ok_or_else(|| Error::TemplateNotFound(name.to_string()))?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, file.data.as_ref())?;
        Ok(())
    }
}

// =============================================================================
// Filesystem Implementation
// =============================================================================

/// Templates read from a directory with the bundled layout
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    root: PathBuf,
}

impl DirectoryTemplates {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateSource for DirectoryTemplates {
    fn has(&self, name: &str) -> bool {
        self.root.join(name).exists()
    }

    fn copy_tree(&self, name: &str, dest: &Path) -> Result<usize> {
        let source = self.root.join(name);
        if !source.is_dir() {
            return Err(Error::TemplateNotFound(name.to_string()));
        }

        let files = fs_extra::dir::get_dir_content(&source)
            .map_err(fs_extra_error)?
            .files
            .len();

        std::fs::create_dir_all(dest)?;
        let options = fs_extra::dir::CopyOptions::new()
            .content_only(true)
            .overwrite(true);
        fs_extra::dir::copy(&source, dest, &options).map_err(fs_extra_error)?;
        Ok(files)
    }

    fn copy_file(&self, name: &str, dest: &Path) -> Result<()> {
        let source = self.root.join(name);
        if !source.is_file() {
            return Err(Error::TemplateNotFound(name.to_string()));
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&source, dest)?;
        Ok(())
    }
}

/// Copy every entry of `source` except `.git` into `dest`
pub fn copy_checkout(source: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)?;
    let entries: Vec<PathBuf> = std::fs::read_dir(source)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name() != ".git")
        .map(|entry| entry.path())
        .collect();

    let options = fs_extra::dir::CopyOptions::new().overwrite(true);
    fs_extra::copy_items(&entries, dest, &options).map_err(fs_extra_error)?;
    Ok(())
}
