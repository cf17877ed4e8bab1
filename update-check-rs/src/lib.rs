//! # Update Status Page Model
//!
//! Turns the result of a release check into what the admin "updates" page
//! shows: either the display fields for an available release, or a status
//! message (checking disabled, check failed, already up to date).
//!
//! The release check itself is an external collaborator behind the
//! `UpdateChecker` trait; this crate only owns the three-way branch over
//! its result and the field formatting.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings the updates page is rendered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePageConfig {
    /// Whether release checking is enabled at all
    pub check_for_updates: bool,

    /// chrono format string used for the release date
    pub date_format: String,
}

impl Default for UpdatePageConfig {
    /// Checking is off unless the panel explicitly enables it.
    fn default() -> Self {
        Self {
            check_for_updates: false,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl UpdatePageConfig {
    /// Config with checking enabled and the default date format.
    pub fn enabled() -> Self {
        Self {
            check_for_updates: true,
            ..Self::default()
        }
    }

    /// Set the release-date format string.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }
}

/// Metadata of a published release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Release tag (e.g. "v1.4.2")
    pub tag_name: String,

    /// Publication instant
    pub created_at: DateTime<Utc>,

    /// Release notes
    pub body: String,

    /// Tar archive download URL
    pub tarball_url: String,

    /// Zip archive download URL
    pub zipball_url: String,
}

/// Outcome of asking the external checker for the latest release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCheck {
    /// Whether a newer release than the running one exists
    pub available: bool,

    /// Metadata of that release, when the checker could retrieve it
    pub info: Option<ReleaseInfo>,

    /// Error reported by the checker, if the check failed
    pub error: Option<String>,
}

impl UpdateCheck {
    /// A check that found no newer release.
    pub fn up_to_date() -> Self {
        Self::default()
    }

    /// A check that found a newer release.
    pub fn update_available(info: ReleaseInfo) -> Self {
        Self {
            available: true,
            info: Some(info),
            error: None,
        }
    }

    /// A failed check.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            available: false,
            info: None,
            error: Some(error.into()),
        }
    }
}

/// External collaborator that performs the actual release check.
#[async_trait]
pub trait UpdateChecker: Send + Sync {
    /// Query for the latest release relative to the running version.
    async fn check(&self) -> UpdateCheck;
}

/// Display fields for an available release, handed to the templating
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFields {
    pub release_version: String,
    pub release_date: String,
    pub release_description: String,
    pub tarball_url: String,
    pub zipball_url: String,
}

/// What the updates page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePage {
    /// Release checking is disabled in panel configuration
    Disabled,
    /// A newer release exists; show its details and download links
    UpdateAvailable(UpdateFields),
    /// The check failed, or reported an update without its metadata
    CheckFailed(String),
    /// The running version is current
    UpToDate,
}

impl UpdatePage {
    /// Status message for the page-messaging collaborator, when this page
    /// state carries one instead of display fields.
    pub fn status_message(&self) -> Option<String> {
        match self {
            UpdatePage::Disabled => Some("Version update checking is disabled".to_string()),
            UpdatePage::CheckFailed(message) => Some(message.clone()),
            UpdatePage::UpToDate => Some("No update available".to_string()),
            UpdatePage::UpdateAvailable(_) => None,
        }
    }
}

/// Maps a check result to the page state.
pub fn render_update_page(config: &UpdatePageConfig, check: &UpdateCheck) -> UpdatePage {
    if !config.check_for_updates {
        return UpdatePage::Disabled;
    }

    if check.available {
        match &check.info {
            Some(info) => UpdatePage::UpdateAvailable(UpdateFields {
                release_version: info.tag_name.clone(),
                release_date: info.created_at.format(&config.date_format).to_string(),
                release_description: info.body.clone(),
                tarball_url: info.tarball_url.clone(),
                zipball_url: info.zipball_url.clone(),
            }),
            None => UpdatePage::CheckFailed(
                check
                    .error
                    .clone()
                    .unwrap_or_else(|| "Update metadata unavailable".to_string()),
            ),
        }
    } else if let Some(error) = &check.error {
        UpdatePage::CheckFailed(error.clone())
    } else {
        UpdatePage::UpToDate
    }
}

/// Runs the checker and maps its result to the page state.
///
/// When checking is disabled the checker is never invoked.
pub async fn build_update_page<C: UpdateChecker>(
    config: &UpdatePageConfig,
    checker: &C,
) -> UpdatePage {
    if !config.check_for_updates {
        return UpdatePage::Disabled;
    }

    let check = checker.check().await;
    if let Some(error) = &check.error {
        debug!(%error, "release check reported an error");
    }

    render_update_page(config, &check)
}
