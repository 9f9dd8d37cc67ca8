//! Profile — the raw user record the engine scores against.
//!
//! Every field is optional on the wire. Deserialization never fails on a
//! missing or unknown value: categoricals fall back to a documented default
//! and numerics to their neutral value, so a partially-filled form upstream
//! can never take down a recommendation request.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Highest completed education level. Unknown strings map to `UG`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Education {
    #[default]
    #[serde(alias = "Bachelors", alias = "bachelors", alias = "ug")]
    UG,
    #[serde(alias = "Masters", alias = "masters", alias = "pg")]
    PG,
    #[serde(alias = "phd", alias = "Phd")]
    PhD,
    #[serde(alias = "bootcamp")]
    Bootcamp,
}

/// Preferred working mode. Unknown strings map to `Team`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkPreference {
    #[default]
    Team,
    Solo,
    Hybrid,
}

/// Self-reported mood signal. Unknown strings map to `Neutral`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Happy,
    #[default]
    Neutral,
    Stressed,
}

/// The seven interest sliders, each 1..=5 with 3 as the neutral default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interests {
    #[serde(rename = "interest_data", default = "neutral_interest")]
    pub data: i64,
    #[serde(rename = "interest_programming", default = "neutral_interest")]
    pub programming: i64,
    #[serde(rename = "interest_design", default = "neutral_interest")]
    pub design: i64,
    #[serde(rename = "interest_hardware", default = "neutral_interest")]
    pub hardware: i64,
    #[serde(rename = "interest_management", default = "neutral_interest")]
    pub management: i64,
    #[serde(rename = "interest_research", default = "neutral_interest")]
    pub research: i64,
    #[serde(rename = "interest_teaching", default = "neutral_interest")]
    pub teaching: i64,
}

fn neutral_interest() -> i64 {
    3
}

impl Default for Interests {
    fn default() -> Self {
        Self {
            data: 3,
            programming: 3,
            design: 3,
            hardware: 3,
            management: 3,
            research: 3,
            teaching: 3,
        }
    }
}

/// One axis of the interest sliders; catalog entries name the pair each
/// role is scored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestAxis {
    Data,
    Programming,
    Design,
    Hardware,
    Management,
    Research,
    Teaching,
}

impl Interests {
    pub fn axis(&self, axis: InterestAxis) -> i64 {
        match axis {
            InterestAxis::Data => self.data,
            InterestAxis::Programming => self.programming,
            InterestAxis::Design => self.design,
            InterestAxis::Hardware => self.hardware,
            InterestAxis::Management => self.management,
            InterestAxis::Research => self.research,
            InterestAxis::Teaching => self.teaching,
        }
    }

    fn clamp_all(&mut self) {
        for v in [
            &mut self.data,
            &mut self.programming,
            &mut self.design,
            &mut self.hardware,
            &mut self.management,
            &mut self.research,
            &mut self.teaching,
        ] {
            *v = (*v).clamp(1, 5);
        }
    }
}

/// Raw profile record, constructed per request and validated upstream.
/// The engine only relies on `sanitize()` having run before scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Stable reference for the history record; generated when absent.
    #[serde(default = "Uuid::new_v4")]
    pub profile_ref: Uuid,
    #[serde(default = "default_age")]
    pub age: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub education: Education,
    #[serde(default = "default_field_of_study")]
    pub field_of_study: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default = "default_personality")]
    pub personality: String,
    #[serde(default = "neutral_interest")]
    pub risk_taking: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub work_preference: WorkPreference,
    #[serde(default = "default_motivation")]
    pub motivation_score: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub sentiment: Sentiment,
    #[serde(default = "default_years_experience")]
    pub years_experience: f64,
    #[serde(default)]
    pub desired_roles: Vec<String>,
    #[serde(flatten)]
    pub interests: Interests,
}

fn default_age() -> i64 {
    25
}

fn default_field_of_study() -> String {
    "CS".to_string()
}

fn default_personality() -> String {
    "ambivert".to_string()
}

fn default_motivation() -> i64 {
    70
}

fn default_years_experience() -> f64 {
    2.0
}

/// Deserializes an enum field, substituting the default on any unknown
/// value instead of failing the whole request.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            profile_ref: Uuid::new_v4(),
            age: 25,
            education: Education::UG,
            field_of_study: "CS".to_string(),
            skills: Vec::new(),
            personality: "ambivert".to_string(),
            risk_taking: 3,
            work_preference: WorkPreference::Team,
            motivation_score: 70,
            sentiment: Sentiment::Neutral,
            years_experience: 2.0,
            desired_roles: Vec::new(),
            interests: Interests::default(),
        }
    }
}

impl Profile {
    /// Clamps every numeric field into its documented range and normalizes
    /// skill and role tokens. Idempotent; the engine runs this once per
    /// request before any scoring.
    pub fn sanitize(mut self) -> Self {
        self.age = self.age.clamp(14, 100);
        self.risk_taking = self.risk_taking.clamp(1, 5);
        self.motivation_score = self.motivation_score.clamp(0, 100);
        if !self.years_experience.is_finite() || self.years_experience < 0.0 {
            self.years_experience = 0.0;
        }
        self.interests.clamp_all();
        self.skills = normalize_tokens(&self.skills);
        self.desired_roles = self
            .desired_roles
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        self
    }

    /// Normalized risk tolerance in [0, 1]; the fallback scorer's stand-in
    /// for the missing ML term.
    pub fn risk_fit(&self) -> f64 {
        ((self.risk_taking - 1) as f64 / 4.0).clamp(0.0, 1.0)
    }
}

/// Lowercases, trims, and underscores skill tokens so profile skills and
/// catalog required-skill lists compare exactly.
pub fn normalize_tokens(raw: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(raw.len());
    for token in raw {
        let t = token.trim().to_lowercase().replace([' ', '-'], "_");
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_gets_all_defaults() {
        let p: Profile = serde_json::from_str("{}").unwrap();
        assert_eq!(p.age, 25);
        assert_eq!(p.education, Education::UG);
        assert_eq!(p.sentiment, Sentiment::Neutral);
        assert_eq!(p.work_preference, WorkPreference::Team);
        assert_eq!(p.motivation_score, 70);
        assert_eq!(p.years_experience, 2.0);
        assert_eq!(p.interests, Interests::default());
        assert!(p.skills.is_empty());
    }

    #[test]
    fn test_unknown_education_maps_to_ug() {
        let p: Profile =
            serde_json::from_str(r#"{"education": "Diploma of Wizardry"}"#).unwrap();
        assert_eq!(p.education, Education::UG);
    }

    #[test]
    fn test_bachelors_alias_maps_to_ug() {
        let p: Profile = serde_json::from_str(r#"{"education": "Bachelors"}"#).unwrap();
        assert_eq!(p.education, Education::UG);
        let p: Profile = serde_json::from_str(r#"{"education": "Masters"}"#).unwrap();
        assert_eq!(p.education, Education::PG);
    }

    #[test]
    fn test_unknown_sentiment_maps_to_neutral() {
        let p: Profile = serde_json::from_str(r#"{"sentiment": "euphoric"}"#).unwrap();
        assert_eq!(p.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_interest_fields_flatten() {
        let p: Profile =
            serde_json::from_str(r#"{"interest_data": 5, "interest_programming": 4}"#).unwrap();
        assert_eq!(p.interests.data, 5);
        assert_eq!(p.interests.programming, 4);
        assert_eq!(p.interests.design, 3);
    }

    #[test]
    fn test_sanitize_clamps_ranges() {
        let p = Profile {
            risk_taking: 9,
            motivation_score: 400,
            years_experience: -3.0,
            interests: Interests {
                data: 12,
                ..Interests::default()
            },
            ..Profile::default()
        }
        .sanitize();
        assert_eq!(p.risk_taking, 5);
        assert_eq!(p.motivation_score, 100);
        assert_eq!(p.years_experience, 0.0);
        assert_eq!(p.interests.data, 5);
    }

    #[test]
    fn test_normalize_tokens_lowercases_and_dedupes() {
        let tokens = normalize_tokens(&[
            " Python ".to_string(),
            "python".to_string(),
            "Machine Learning".to_string(),
            "".to_string(),
        ]);
        assert_eq!(tokens, vec!["python", "machine_learning"]);
    }

    #[test]
    fn test_risk_fit_linear_ramp() {
        let mut p = Profile::default();
        p.risk_taking = 1;
        assert_eq!(p.risk_fit(), 0.0);
        p.risk_taking = 3;
        assert_eq!(p.risk_fit(), 0.5);
        p.risk_taking = 5;
        assert_eq!(p.risk_fit(), 1.0);
    }
}
