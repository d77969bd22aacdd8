use anyhow::{bail, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::website::{website_config_path, PreferenceEdits, WebsiteConfig};

#[derive(Debug, Serialize)]
pub struct PrefsResult {
    pub path: PathBuf,
    pub saved: bool,
    pub config: WebsiteConfig,
}

pub fn cmd_prefs_show(repo_root: &Path) -> Result<PrefsResult> {
    let config = WebsiteConfig::load(repo_root)?;
    Ok(PrefsResult {
        path: website_config_path(repo_root),
        saved: false,
        config,
    })
}

pub fn cmd_prefs_set(repo_root: &Path, edits: &PreferenceEdits) -> Result<PrefsResult> {
    if edits.is_empty() {
        bail!("no preference given\nHint: e.g. lap-updater prefs set --driver-name \"Your Name\"");
    }

    let mut config = WebsiteConfig::load(repo_root)?;
    config.apply(edits);
    let path = config.save(repo_root)?;

    Ok(PrefsResult {
        path,
        saved: true,
        config,
    })
}

fn field(lines: &mut Vec<String>, label: &str, value: &Option<String>) {
    lines.push(format!("  {:<20} {}", label, value.as_deref().unwrap_or("")));
}

pub fn format_prefs_human(result: &PrefsResult) -> String {
    let c = &result.config;
    let mut lines = Vec::new();
    if result.saved {
        lines.push(format!("Preference saved to {}", result.path.display()));
        lines.push(String::new());
    }

    lines.push("Driver Profile".to_string());
    field(&mut lines, "Name", &c.driver_profile.name);
    field(&mut lines, "Gear", &c.driver_profile.gear);
    field(&mut lines, "Featured link label", &c.driver_profile.featured_link.label);
    field(&mut lines, "Featured link url", &c.driver_profile.featured_link.url);

    lines.push("Featured Lap".to_string());
    lines.push(format!("  {:<20} {}", "Show", c.featured_lap.show));
    field(&mut lines, "Track", &c.featured_lap.track);
    field(&mut lines, "Car", &c.featured_lap.car);
    field(&mut lines, "Note", &c.featured_lap.note);

    lines.push("Meta".to_string());
    field(&mut lines, "Title", &c.meta.title);
    field(&mut lines, "Description", &c.meta.description);
    field(&mut lines, "Site URL", &c.meta.site_url);
    field(&mut lines, "Base", &c.meta.base);
    field(&mut lines, "Image", &c.meta.image);

    lines.join("\n")
}
