//! Gap & plan generator — what the user is missing for the top role and
//! what to learn first.
//!
//! Pure functions over the profile's skill set and the catalog; no I/O,
//! no randomness. Catalog ordering of required skills encodes priority
//! and is preserved into both outputs.

use serde::{Deserialize, Serialize};

use crate::catalog::RoleCatalog;
use crate::profile::Profile;

/// The plan covers at most this many missing skills.
const PLAN_LEN: usize = 4;

/// One step of the learning plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub skill: String,
    pub course: String,
    pub source: String,
    pub weeks: u32,
}

/// Skill gap against one role. `required` and `missing` preserve catalog
/// order; `have` is the user's full normalized skill list, not just the
/// overlap with the role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillGap {
    pub required: Vec<String>,
    pub have: Vec<String>,
    pub missing: Vec<String>,
}

/// Computes the gap for `role`. Unknown roles read as an empty required
/// set, so everything degrades to empty lists instead of erroring.
pub fn skill_gap(profile: &Profile, catalog: &RoleCatalog, role: &str) -> SkillGap {
    let required: Vec<String> = catalog.required_skills(role).to_vec();
    let missing = required
        .iter()
        .filter(|s| !profile.skills.contains(s))
        .cloned()
        .collect();
    SkillGap {
        required,
        have: profile.skills.clone(),
        missing,
    }
}

/// A learning plan for the first missing skills. Skills with no course
/// mapping still get a step, with a generic placeholder course, so the
/// plan never silently shrinks below the gap it covers.
pub fn learning_plan(gap: &[String], catalog: &RoleCatalog) -> Vec<PlanStep> {
    gap.iter()
        .take(PLAN_LEN)
        .map(|skill| match catalog.course_for(skill) {
            Some(course) => PlanStep {
                skill: skill.clone(),
                course: course.course.clone(),
                source: course.source.clone(),
                weeks: course.weeks,
            },
            None => PlanStep {
                skill: skill.clone(),
                course: format!("Deep dive into {skill}"),
                source: "TBD".to_string(),
                weeks: 2,
            },
        })
        .collect()
}
