use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_PROBE_URL};
use crate::website::PreferenceEdits;

#[derive(Parser)]
#[command(
    name = "lap-updater",
    version,
    about = "Publish lap times from personalbest.ini to your website repository"
)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose diagnostics on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the lap-updater configuration
    Init {
        /// The game's personalbest.ini
        #[arg(long)]
        source: Option<String>,
        /// Root folder of the website git repository
        #[arg(long)]
        repo: Option<String>,
        /// URL probed before any network work
        #[arg(long, default_value = DEFAULT_PROBE_URL)]
        probe_url: String,
        /// Probe timeout in milliseconds
        #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT_MS)]
        probe_timeout_ms: u64,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
        /// Print config path and exit
        #[arg(long)]
        show_path: bool,
    },
    /// Copy personalbest.ini into the repo and look for changes to publish
    Check,
    /// Commit and push the detected changes
    Publish {
        /// Publish even if no check found changes
        #[arg(long)]
        force: bool,
    },
    /// Check, then publish if anything changed
    Sync,
    /// Show the result of the last publish
    Status,
    /// View or edit the website's src/data/config.json
    Prefs {
        /// Website repo root (defaults to the configured one)
        #[arg(long, global = true)]
        repo: Option<String>,

        #[command(subcommand)]
        action: PrefsCommand,
    },
}

#[derive(Subcommand)]
pub enum PrefsCommand {
    /// Print the current preferences
    Show,
    /// Change one or more preferences
    Set(PrefsSetArgs),
}

#[derive(Args)]
pub struct PrefsSetArgs {
    #[arg(long)]
    pub driver_name: Option<String>,
    #[arg(long)]
    pub driver_gear: Option<String>,
    #[arg(long)]
    pub featured_link_label: Option<String>,
    #[arg(long)]
    pub featured_link_url: Option<String>,
    /// true or false
    #[arg(long)]
    pub featured_lap_show: Option<bool>,
    #[arg(long)]
    pub featured_lap_track: Option<String>,
    #[arg(long)]
    pub featured_lap_car: Option<String>,
    #[arg(long)]
    pub featured_lap_note: Option<String>,
    #[arg(long)]
    pub meta_title: Option<String>,
    #[arg(long)]
    pub meta_description: Option<String>,
    #[arg(long)]
    pub meta_site_url: Option<String>,
    #[arg(long)]
    pub meta_base: Option<String>,
    #[arg(long)]
    pub meta_image: Option<String>,
}

impl From<PrefsSetArgs> for PreferenceEdits {
    fn from(args: PrefsSetArgs) -> Self {
        PreferenceEdits {
            driver_name: args.driver_name,
            driver_gear: args.driver_gear,
            featured_link_label: args.featured_link_label,
            featured_link_url: args.featured_link_url,
            featured_lap_show: args.featured_lap_show,
            featured_lap_track: args.featured_lap_track,
            featured_lap_car: args.featured_lap_car,
            featured_lap_note: args.featured_lap_note,
            meta_title: args.meta_title,
            meta_description: args.meta_description,
            meta_site_url: args.meta_site_url,
            meta_base: args.meta_base,
            meta_image: args.meta_image,
        }
    }
}
