//! Role catalog — the static configuration every scoring pass reads.
//!
//! Declaration order matters: it is the tie-break order for the ranker, so
//! the catalog keeps roles in a `Vec` and never sorts them. Loaded once at
//! startup from JSON; reloadable between restarts but never hot-swapped
//! mid-request.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::EngineError;
use crate::profile::InterestAxis;

/// Direction of a role's synthetic market series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Rising,
    #[default]
    Stable,
    Falling,
}

/// Labor-statistics constants behind the trend synthesizer. Static and
/// possibly stale; display heuristic only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GrowthParameters {
    pub annual_openings: i64,
    pub total_jobs: i64,
    pub growth_rate: f64,
}

/// One catalog role. `required_skills` ordering encodes priority and is
/// preserved end-to-end into the skill gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleEntry {
    pub role: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub growth: Option<GrowthParameters>,
    #[serde(default)]
    pub trend: TrendLabel,
    /// Interest-axis pair this role is scored against; `None` reads as
    /// neutral (3, 3) in the ranker.
    #[serde(default)]
    pub interest_axes: Option<(InterestAxis, InterestAxis)>,
}

/// A course recommendation for a missing skill. The config file accepts
/// either a bare course name or a structured record; both normalize to
/// this variant at load time so no caller ever branches on shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub course: String,
    pub source: String,
    pub weeks: u32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CourseRef {
    PlainName(String),
    Structured {
        course: String,
        #[serde(default = "default_course_source")]
        source: String,
        #[serde(default = "default_course_weeks")]
        weeks: u32,
    },
}

fn default_course_source() -> String {
    "online".to_string()
}

fn default_course_weeks() -> u32 {
    2
}

impl From<CourseRef> for Course {
    fn from(value: CourseRef) -> Self {
        match value {
            CourseRef::PlainName(course) => Course {
                course,
                source: default_course_source(),
                weeks: default_course_weeks(),
            },
            CourseRef::Structured {
                course,
                source,
                weeks,
            } => Course {
                course,
                source,
                weeks,
            },
        }
    }
}

/// Returned when the candidate role set is empty after filtering; the
/// engine must answer with these rather than an empty result.
pub const DEFAULT_ROLES: [&str; 3] = ["Software Developer", "Data Analyst", "Project Manager"];

#[derive(Debug, Deserialize)]
struct CatalogFile {
    roles: Vec<RoleEntry>,
}

/// Ordered role catalog plus the skill → course mapping.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    roles: Vec<RoleEntry>,
    index: HashMap<String, usize>,
    courses: HashMap<String, Course>,
}

impl RoleCatalog {
    pub fn new(roles: Vec<RoleEntry>, courses: HashMap<String, Course>) -> Self {
        let index = roles
            .iter()
            .enumerate()
            .map(|(i, r)| (r.role.clone(), i))
            .collect();
        Self {
            roles,
            index,
            courses,
        }
    }

    /// Loads the catalog and course map from JSON files. A missing or
    /// unreadable course file degrades to an empty map; the catalog file
    /// itself is required.
    pub fn load(catalog_path: &Path, courses_path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(catalog_path).map_err(|e| {
            EngineError::Catalog(format!("cannot read {}: {e}", catalog_path.display()))
        })?;
        let file: CatalogFile = serde_json::from_str(&raw)
            .map_err(|e| EngineError::Catalog(format!("invalid catalog JSON: {e}")))?;

        let courses = match std::fs::read_to_string(courses_path) {
            Ok(raw) => {
                let refs: HashMap<String, CourseRef> = serde_json::from_str(&raw)
                    .map_err(|e| EngineError::Catalog(format!("invalid course JSON: {e}")))?;
                refs.into_iter().map(|(k, v)| (k, v.into())).collect()
            }
            Err(_) => HashMap::new(),
        };

        info!(
            roles = file.roles.len(),
            courses = courses.len(),
            "role catalog loaded"
        );
        Ok(Self::new(file.roles, courses))
    }

    pub fn roles(&self) -> &[RoleEntry] {
        &self.roles
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn entry(&self, role: &str) -> Option<&RoleEntry> {
        self.index.get(role).map(|&i| &self.roles[i])
    }

    /// Required skills for a role; empty for roles the catalog does not
    /// know, so skill-fit and gap computation degrade instead of erroring.
    pub fn required_skills(&self, role: &str) -> &[String] {
        self.entry(role)
            .map(|e| e.required_skills.as_slice())
            .unwrap_or(&[])
    }

    pub fn course_for(&self, skill: &str) -> Option<&Course> {
        self.courses.get(skill)
    }

    pub fn trend(&self, role: &str) -> TrendLabel {
        self.entry(role).map(|e| e.trend).unwrap_or_default()
    }

    pub fn growth(&self, role: &str) -> Option<GrowthParameters> {
        self.entry(role).and_then(|e| e.growth)
    }
}
