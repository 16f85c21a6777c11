//! Plant-map document model: trackers, colors, snapshots

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// The color palette owned by the maintenance-cycle engine. Any other color
/// value on a tracker is decorative and passed through unchanged.
pub mod color {
    /// Not yet touched in the current cycle.
    pub const BASELINE: &str = "#ffffff";
    /// Work started / half complete.
    pub const HALFWAY: &str = "#f6bf26";
    /// Work complete.
    pub const DONE: &str = "#33b679";
}

/// Trackers named `TR-` + two digits count toward cycle progress; anything
/// else on the map (legend, compass, labels) is layout-only.
static ELIGIBLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TR-\d{2}$").expect("tracker id pattern"));

/// Whether a tracker id participates in cycle math.
pub fn is_cycle_eligible(id: &str) -> bool {
    ELIGIBLE_ID.is_match(id)
}

/// The two independent maintenance activities tracked on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    GrassCutting,
    PanelWash,
}

impl TaskType {
    pub const ALL: [TaskType; 2] = [TaskType::GrassCutting, TaskType::PanelWash];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::GrassCutting => "grass_cutting",
            TaskType::PanelWash => "panel_wash",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grass_cutting" => Ok(TaskType::GrassCutting),
            "panel_wash" => Ok(TaskType::PanelWash),
            other => Err(format!("unknown task type: {other}")),
        }
    }
}

/// The proposed state for a tracker, mapping to a palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusType {
    Done,
    Halfway,
}

impl StatusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusType::Done => "done",
            StatusType::Halfway => "halfway",
        }
    }

    /// The color an approval paints onto the tracker.
    pub fn target_color(&self) -> &'static str {
        match self {
            StatusType::Done => color::DONE,
            StatusType::Halfway => color::HALFWAY,
        }
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "done" => Ok(StatusType::Done),
            "halfway" => Ok(StatusType::Halfway),
            other => Err(format!("unknown status type: {other}")),
        }
    }
}

/// A map entity. Position, labels and any other layout attributes ride in
/// `layout` untouched; this core only owns the two color fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracker {
    pub id: String,
    #[serde(default = "baseline_color")]
    pub grass_cutting_color: String,
    #[serde(default = "baseline_color")]
    pub panel_wash_color: String,
    #[serde(flatten)]
    pub layout: serde_json::Map<String, serde_json::Value>,
}

fn baseline_color() -> String {
    color::BASELINE.to_string()
}

impl Tracker {
    /// A tracker with both activities at baseline and no layout payload.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            grass_cutting_color: baseline_color(),
            panel_wash_color: baseline_color(),
            layout: serde_json::Map::new(),
        }
    }

    pub fn is_cycle_eligible(&self) -> bool {
        is_cycle_eligible(&self.id)
    }

    /// The color field for one activity.
    pub fn color_for(&self, task_type: TaskType) -> &str {
        match task_type {
            TaskType::GrassCutting => &self.grass_cutting_color,
            TaskType::PanelWash => &self.panel_wash_color,
        }
    }

    pub fn set_color_for(&mut self, task_type: TaskType, value: impl Into<String>) {
        match task_type {
            TaskType::GrassCutting => self.grass_cutting_color = value.into(),
            TaskType::PanelWash => self.panel_wash_color = value.into(),
        }
    }

    /// Both activities back to baseline.
    pub fn clear_colors(&mut self) {
        self.grass_cutting_color = baseline_color();
        self.panel_wash_color = baseline_color();
    }
}

/// The map document for one tenant at one version.
///
/// Version 0 means "no snapshot persisted yet" — an empty map, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
    pub trackers: Vec<Tracker>,
}

impl MapSnapshot {
    /// The snapshot returned for tenants with no persisted map.
    pub fn empty(tenant: Option<String>) -> Self {
        Self {
            tenant,
            version: 0,
            updated_at: Utc::now(),
            trackers: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligible_id_pattern() {
        assert!(is_cycle_eligible("TR-01"));
        assert!(is_cycle_eligible("TR-99"));
        assert!(!is_cycle_eligible("TR-1"));
        assert!(!is_cycle_eligible("TR-100"));
        assert!(!is_cycle_eligible("tr-01"));
        assert!(!is_cycle_eligible("legend"));
        assert!(!is_cycle_eligible("north-arrow"));
        assert!(!is_cycle_eligible(""));
    }

    #[test]
    fn test_task_type_serde_roundtrip() {
        for task_type in TaskType::ALL {
            let json = serde_json::to_string(&task_type).unwrap();
            let back: TaskType = serde_json::from_str(&json).unwrap();
            assert_eq!(task_type, back);
        }
        assert_eq!(
            serde_json::to_string(&TaskType::GrassCutting).unwrap(),
            "\"grass_cutting\""
        );
    }

    #[test]
    fn test_status_type_target_colors() {
        assert_eq!(StatusType::Done.target_color(), color::DONE);
        assert_eq!(StatusType::Halfway.target_color(), color::HALFWAY);
    }

    #[test]
    fn test_tracker_layout_payload_passes_through() {
        let json = r##"{
            "id": "TR-01",
            "grass_cutting_color": "#ffffff",
            "panel_wash_color": "#33b679",
            "x": 120,
            "y": 48.5,
            "label": "Row 1 east"
        }"##;

        let tracker: Tracker = serde_json::from_str(json).unwrap();
        assert_eq!(tracker.id, "TR-01");
        assert_eq!(tracker.panel_wash_color, color::DONE);
        assert_eq!(tracker.layout["x"], 120);
        assert_eq!(tracker.layout["label"], "Row 1 east");

        let out: serde_json::Value =
            serde_json::to_value(&tracker).unwrap();
        assert_eq!(out["x"], 120);
        assert_eq!(out["y"], 48.5);
    }

    #[test]
    fn test_tracker_missing_colors_default_to_baseline() {
        let tracker: Tracker = serde_json::from_str(r#"{"id": "TR-07"}"#).unwrap();
        assert_eq!(tracker.grass_cutting_color, color::BASELINE);
        assert_eq!(tracker.panel_wash_color, color::BASELINE);
    }

    #[test]
    fn test_non_palette_color_is_preserved() {
        let mut tracker = Tracker::new("TR-02");
        tracker.set_color_for(TaskType::GrassCutting, "#ff00ff");
        assert_eq!(tracker.color_for(TaskType::GrassCutting), "#ff00ff");
        tracker.clear_colors();
        assert_eq!(tracker.color_for(TaskType::GrassCutting), color::BASELINE);
        assert_eq!(tracker.color_for(TaskType::PanelWash), color::BASELINE);
    }

    #[test]
    fn test_empty_snapshot_is_version_zero() {
        let snapshot = MapSnapshot::empty(Some("alpha-plant".into()));
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.trackers.is_empty());
    }
}
