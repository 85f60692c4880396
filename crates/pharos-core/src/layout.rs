//! Project directory layout
//!
//! The [`ProjectLayout`] struct names every path configure-pharos reads or
//! writes inside a project, so commands never depend on the process working
//! directory.

use std::path::{Path, PathBuf};

/// Paths of a configure-pharos project rooted at a given directory.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// File name of the persisted project configuration
    pub const CONFIG_FILE: &str = "pharos-config.json";

    /// Directory holding the smart-contract sources
    pub const CONTRACT_DIR: &str = "smart-contract";

    /// Older projects used this name for the contract directory
    pub const LEGACY_CONTRACT_DIR: &str = "contract";

    /// Directory holding the scaffolded frontend
    pub const FRONTEND_DIR: &str = "frontend";

    /// Create a layout rooted at the given project directory.
    pub fn at<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Get the project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a relative path to the project root.
    pub fn join<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.root.join(path)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(Self::CONFIG_FILE)
    }

    /// Where init places the contract sources.
    pub fn contract_dir(&self) -> PathBuf {
        self.root.join(Self::CONTRACT_DIR)
    }

    pub fn frontend_dir(&self) -> PathBuf {
        self.root.join(Self::FRONTEND_DIR)
    }

    /// Find an existing contract directory, preferring `smart-contract/`.
    pub fn find_contract_dir(&self) -> Option<PathBuf> {
        [Self::CONTRACT_DIR, Self::LEGACY_CONTRACT_DIR]
            .iter()
            .map(|name| self.root.join(name))
            .find(|path| path.is_dir())
    }

    /// Check if the project root exists and holds at least one entry.
    pub fn is_populated(&self) -> bool {
        std::fs::read_dir(&self.root)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = ProjectLayout::at("/work/my-dapp");
        assert_eq!(layout.root(), Path::new("/work/my-dapp"));
        assert_eq!(
            layout.config_path(),
            PathBuf::from("/work/my-dapp/pharos-config.json")
        );
        assert_eq!(
            layout.contract_dir(),
            PathBuf::from("/work/my-dapp/smart-contract")
        );
        assert_eq!(
            layout.frontend_dir(),
            PathBuf::from("/work/my-dapp/frontend")
        );
        assert_eq!(
            layout.join("smart-contract/.env"),
            PathBuf::from("/work/my-dapp/smart-contract/.env")
        );
    }

    #[test]
    fn test_find_contract_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::at(dir.path());
        assert!(layout.find_contract_dir().is_none());

        std::fs::create_dir(dir.path().join("contract")).unwrap();
        assert_eq!(layout.find_contract_dir(), Some(dir.path().join("contract")));

        std::fs::create_dir(dir.path().join("smart-contract")).unwrap();
        assert_eq!(
            layout.find_contract_dir(),
            Some(dir.path().join("smart-contract"))
        );
    }

    #[test]
    fn test_is_populated() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::at(dir.path());
        assert!(!layout.is_populated());
        assert!(!ProjectLayout::at(dir.path().join("missing")).is_populated());

        std::fs::write(dir.path().join("README.md"), "hi").unwrap();
        assert!(layout.is_populated());
    }
}
