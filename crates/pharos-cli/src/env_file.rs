//! The contract directory's `.env` file

use std::path::Path;

use color_eyre::eyre::Result;
use console::style;

pub const ENV_FILE: &str = ".env";

/// Endpoint written into new `.env` files and used when none is configured
pub const DEFAULT_RPC_URL: &str = "https://devnet.dplabs-internal.com/";

const ENV_TEMPLATE: &str = "RPC_URL=https://devnet.dplabs-internal.com/
WALLET_PRIVATE_KEY=YOUR_WALLET_PRIVATE_KEY
PHAROS_EXPLORER_API=
";

/// Write the placeholder `.env`, leaving an existing one untouched.
///
/// Returns whether a file was written.
pub fn write_env_template(dir: &Path) -> Result<bool> {
    let path = dir.join(ENV_FILE);
    if path.exists() {
        println!(
            "{} {} already exists, skipping creation",
            style("⚠").yellow(),
            ENV_FILE
        );
        return Ok(false);
    }

    std::fs::write(&path, ENV_TEMPLATE)?;
    println!("{} Created {}", style("✓").green(), ENV_FILE);
    Ok(true)
}

/// Read a non-empty variable from `<dir>/.env` without touching the process environment
pub fn read_env_var(dir: &Path, key: &str) -> Option<String> {
    dotenvy::from_path_iter(dir.join(ENV_FILE))
        .ok()?
        .filter_map(|item| item.ok())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value)
        .filter(|value| !value.trim().is_empty())
}

/// Make sure `entry` is listed in `<dir>/.gitignore`, creating the file if needed.
pub fn ensure_gitignored(dir: &Path, entry: &str) -> Result<()> {
    let gitignore_path = dir.join(".gitignore");

    let content = if gitignore_path.exists() {
        std::fs::read_to_string(&gitignore_path)?
    } else {
        String::new()
    };

    // Check for both `entry` and `entry/` patterns
    let has_entry = content
        .lines()
        .any(|line| line.trim() == entry || line.trim() == format!("{}/", entry));
    if !has_entry {
        let mut new_content = content;
        if !new_content.is_empty() && !new_content.ends_with('\n') {
            new_content.push('\n');
        }
        new_content.push_str(entry);
        new_content.push('\n');
        std::fs::write(&gitignore_path, new_content)?;
        println!("{} Added {} to .gitignore", style("✓").green(), entry);
    }

    Ok(())
}
