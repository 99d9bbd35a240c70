//! Camera keyword table and resolver
//!
//! Maps free-text phrases to camera entities. The table is an ordered list and
//! the declaration order is the match priority: the first keyword contained in
//! the command wins. Several keywords overlap ("driveway" is part of "front
//! driveway"), so a substring test alone does not define a unique answer.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const FRONT_DOOR: &str = "camera.doorbell_main_entrance_camera_high_resolution_channel";
const DRIVEWAY: &str = "camera.front_lt_driveway_camera_high_resolution_channel";
const PATIO: &str = "camera.back_rt_facing_patio_camera_high_resolution_channel";
const BACK_ROAD: &str = "camera.back_lt_facing_road_camera_high_resolution_channel";
const GARAGE: &str = "camera.garage_camera_high_resolution_channel";

/// Built-in table, in priority order
const DEFAULT_KEYWORDS: &[(&str, &str, &str)] = &[
    ("front door", FRONT_DOOR, "Front Door Camera"),
    ("doorbell", FRONT_DOOR, "Front Door Camera"),
    ("entrance", FRONT_DOOR, "Front Door Camera"),
    ("main entrance", FRONT_DOOR, "Front Door Camera"),
    ("driveway", DRIVEWAY, "Driveway Camera"),
    ("front driveway", DRIVEWAY, "Driveway Camera"),
    ("front left", DRIVEWAY, "Driveway Camera"),
    ("backyard", PATIO, "Backyard Patio Camera"),
    ("patio", PATIO, "Backyard Patio Camera"),
    ("back patio", PATIO, "Backyard Patio Camera"),
    ("back right", PATIO, "Backyard Patio Camera"),
    ("back road", BACK_ROAD, "Back Road Camera"),
    ("road", BACK_ROAD, "Back Road Camera"),
    ("back left", BACK_ROAD, "Back Road Camera"),
    ("garage", GARAGE, "Garage Camera"),
    ("garage door", GARAGE, "Garage Camera"),
];

/// Commands shown to users who ask what they can say
pub const EXAMPLE_COMMANDS: &[&str] = &[
    "Show me the front door",
    "Check the driveway camera",
    "Display garage camera",
    "Look at the backyard",
    "View the road camera",
];

/// One row of the keyword table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraKeyword {
    /// Phrase matched against the command (case-insensitive)
    pub keyword: String,
    /// Camera entity identifier
    pub entity_id: String,
    /// Name used in responses
    pub friendly_name: String,
}

impl CameraKeyword {
    pub fn new(keyword: &str, entity_id: &str, friendly_name: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            entity_id: entity_id.to_string(),
            friendly_name: friendly_name.to_string(),
        }
    }
}

/// A distinct camera in the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraEntry {
    pub entity_id: String,
    pub friendly_name: String,
}

/// Everything a user needs to know about addressable cameras
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraCatalog {
    pub cameras: Vec<CameraEntry>,
    pub camera_keywords: Vec<String>,
    pub example_commands: Vec<String>,
}

/// Reachability of one camera entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraStatus {
    pub entity_id: String,
    pub friendly_name: String,
    /// Entity state reported by the platform, when the read succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ordered, immutable keyword table
///
/// Built once at startup and shared by reference; nothing mutates it after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraMapping {
    entries: Vec<CameraKeyword>,
}

impl Default for CameraMapping {
    fn default() -> Self {
        Self {
            entries: DEFAULT_KEYWORDS
                .iter()
                .map(|(keyword, entity, name)| CameraKeyword::new(keyword, entity, name))
                .collect(),
        }
    }
}

impl CameraMapping {
    /// Build a table from configured rows, keeping their order
    pub fn new(entries: Vec<CameraKeyword>) -> Result<Self> {
        if entries.is_empty() {
            return Err(BridgeError::config("camera table must not be empty"));
        }

        let mut normalized = Vec::with_capacity(entries.len());
        for entry in entries {
            let keyword = entry.keyword.trim().to_lowercase();
            if keyword.is_empty() {
                return Err(BridgeError::config(format!(
                    "camera keyword for {} is empty",
                    entry.entity_id
                )));
            }
            if !entry.entity_id.starts_with("camera.") {
                return Err(BridgeError::config(format!(
                    "camera entity '{}' must be in the camera domain",
                    entry.entity_id
                )));
            }
            normalized.push(CameraKeyword { keyword, ..entry });
        }

        Ok(Self {
            entries: normalized,
        })
    }

    /// Rows in priority order
    pub fn entries(&self) -> &[CameraKeyword] {
        &self.entries
    }

    /// Resolve a command to the first camera whose keyword it contains
    pub fn resolve(&self, command: &str) -> Result<&CameraKeyword> {
        let command_lower = command.to_lowercase();

        match self
            .entries
            .iter()
            .find(|entry| command_lower.contains(entry.keyword.as_str()))
        {
            Some(entry) => {
                debug!(
                    keyword = %entry.keyword,
                    entity_id = %entry.entity_id,
                    "Resolved camera keyword"
                );
                Ok(entry)
            }
            None => Err(BridgeError::entity_not_found(
                format!("no camera matches '{command}'"),
                self.friendly_names(),
            )),
        }
    }

    /// Distinct cameras in first-declared order
    pub fn cameras(&self) -> Vec<CameraEntry> {
        let mut cameras: Vec<CameraEntry> = Vec::new();
        for entry in &self.entries {
            if !cameras.iter().any(|c| c.entity_id == entry.entity_id) {
                cameras.push(CameraEntry {
                    entity_id: entry.entity_id.clone(),
                    friendly_name: entry.friendly_name.clone(),
                });
            }
        }
        cameras
    }

    /// Distinct friendly names, used as suggestions on a miss
    pub fn friendly_names(&self) -> Vec<String> {
        self.cameras()
            .into_iter()
            .map(|camera| camera.friendly_name)
            .collect()
    }

    pub fn catalog(&self) -> CameraCatalog {
        CameraCatalog {
            cameras: self.cameras(),
            camera_keywords: self.entries.iter().map(|e| e.keyword.clone()).collect(),
            example_commands: EXAMPLE_COMMANDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
