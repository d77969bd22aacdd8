//! The website's own preference file, `src/data/config.json`.
//!
//! Only the fields the site renders are typed; any other keys in the file are
//! carried through a load/save cycle untouched.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteConfig {
    #[serde(default)]
    pub driver_profile: DriverProfile,
    #[serde(default)]
    pub featured_lap: FeaturedLap,
    #[serde(default)]
    pub meta: Meta,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear: Option<String>,
    #[serde(default)]
    pub featured_link: FeaturedLink,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturedLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturedLap {
    #[serde(default)]
    pub show: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields to change. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct PreferenceEdits {
    pub driver_name: Option<String>,
    pub driver_gear: Option<String>,
    pub featured_link_label: Option<String>,
    pub featured_link_url: Option<String>,
    pub featured_lap_show: Option<bool>,
    pub featured_lap_track: Option<String>,
    pub featured_lap_car: Option<String>,
    pub featured_lap_note: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_site_url: Option<String>,
    pub meta_base: Option<String>,
    pub meta_image: Option<String>,
}

impl PreferenceEdits {
    pub fn is_empty(&self) -> bool {
        self.featured_lap_show.is_none()
            && [
                &self.driver_name,
                &self.driver_gear,
                &self.featured_link_label,
                &self.featured_link_url,
                &self.featured_lap_track,
                &self.featured_lap_car,
                &self.featured_lap_note,
                &self.meta_title,
                &self.meta_description,
                &self.meta_site_url,
                &self.meta_base,
                &self.meta_image,
            ]
            .iter()
            .all(|field| field.is_none())
    }
}

pub fn website_config_path(repo_root: &Path) -> PathBuf {
    repo_root.join("src").join("data").join("config.json")
}

impl WebsiteConfig {
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = website_config_path(repo_root);
        if !path.exists() {
            bail!("website config not found: {}", path.display());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn apply(&mut self, edits: &PreferenceEdits) {
        set_trimmed(&mut self.driver_profile.name, &edits.driver_name);
        set_trimmed(&mut self.driver_profile.gear, &edits.driver_gear);
        set_trimmed(
            &mut self.driver_profile.featured_link.label,
            &edits.featured_link_label,
        );
        set_trimmed(
            &mut self.driver_profile.featured_link.url,
            &edits.featured_link_url,
        );

        if let Some(show) = edits.featured_lap_show {
            self.featured_lap.show = show;
        }
        set_trimmed(&mut self.featured_lap.track, &edits.featured_lap_track);
        set_trimmed(&mut self.featured_lap.car, &edits.featured_lap_car);
        set_trimmed(&mut self.featured_lap.note, &edits.featured_lap_note);

        set_trimmed(&mut self.meta.title, &edits.meta_title);
        set_trimmed(&mut self.meta.description, &edits.meta_description);
        set_trimmed(&mut self.meta.site_url, &edits.meta_site_url);
        set_trimmed(&mut self.meta.base, &edits.meta_base);
        set_trimmed(&mut self.meta.image, &edits.meta_image);
    }

    pub fn save(&self, repo_root: &Path) -> Result<PathBuf> {
        let path = website_config_path(repo_root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize website config")?;
        std::fs::write(&path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

fn set_trimmed(field: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        *field = Some(v.trim().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
  "driverProfile": {
    "name": "Sam",
    "gear": "Fanatec CSL DD",
    "featuredLink": { "label": "YouTube", "url": "https://youtube.com/@sam" }
  },
  "featuredLap": { "show": true, "track": "Spa", "car": "GT3", "note": "Dry" },
  "meta": {
    "title": "Lap Times",
    "siteUrl": "https://sam.example",
    "base": "/laps"
  },
  "theme": { "accent": "#ff0000" }
}"##;

    fn write_sample(repo: &Path) {
        let path = website_config_path(repo);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, SAMPLE).unwrap();
    }

    #[test]
    fn load_reads_typed_fields() {
        let tmp = tempfile::tempdir().unwrap();
        write_sample(tmp.path());

        let config = WebsiteConfig::load(tmp.path()).unwrap();
        assert_eq!(config.driver_profile.name.as_deref(), Some("Sam"));
        assert_eq!(
            config.driver_profile.featured_link.url.as_deref(),
            Some("https://youtube.com/@sam")
        );
        assert!(config.featured_lap.show);
        assert_eq!(config.meta.site_url.as_deref(), Some("https://sam.example"));
        assert_eq!(config.meta.description, None);
    }

    #[test]
    fn load_missing_file_names_path() {
        let tmp = tempfile::tempdir().unwrap();
        let err = WebsiteConfig::load(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn load_invalid_json_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let path = website_config_path(tmp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(WebsiteConfig::load(tmp.path()).is_err());
    }

    #[test]
    fn apply_trims_and_only_touches_given_fields() {
        let tmp = tempfile::tempdir().unwrap();
        write_sample(tmp.path());
        let mut config = WebsiteConfig::load(tmp.path()).unwrap();

        config.apply(&PreferenceEdits {
            driver_gear: Some("  Moza R9  ".to_string()),
            featured_lap_show: Some(false),
            meta_description: Some("Personal bests".to_string()),
            ..PreferenceEdits::default()
        });

        assert_eq!(config.driver_profile.gear.as_deref(), Some("Moza R9"));
        assert_eq!(config.driver_profile.name.as_deref(), Some("Sam"));
        assert!(!config.featured_lap.show);
        assert_eq!(config.featured_lap.track.as_deref(), Some("Spa"));
        assert_eq!(config.meta.description.as_deref(), Some("Personal bests"));
    }

    #[test]
    fn save_keeps_unknown_keys_and_omits_unset_fields() {
        let tmp = tempfile::tempdir().unwrap();
        write_sample(tmp.path());
        let config = WebsiteConfig::load(tmp.path()).unwrap();

        let path = config.save(tmp.path()).unwrap();

        let saved: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(saved["theme"]["accent"], "#ff0000");
        assert_eq!(saved["meta"]["siteUrl"], "https://sam.example");
        assert!(saved["meta"].get("description").is_none());
    }

    #[test]
    fn empty_edits_detected() {
        assert!(PreferenceEdits::default().is_empty());
        assert!(!PreferenceEdits {
            featured_lap_show: Some(true),
            ..PreferenceEdits::default()
        }
        .is_empty());
        assert!(!PreferenceEdits {
            meta_image: Some("og.png".to_string()),
            ..PreferenceEdits::default()
        }
        .is_empty());
    }
}
