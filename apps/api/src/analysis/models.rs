//! Result shapes returned to callers. Field names on the wire are the ones the
//! prompts ask the model for, so a model reply deserializes straight into these.
//!
//! Every field defaults when the model leaves it out, and numeric fields accept
//! numeric strings: model output is trusted as-is, never validated.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ────────────────────────────────────────────────────────────────────────────
// Comprehensive analysis
// ────────────────────────────────────────────────────────────────────────────

/// Structured profile plus interview-preparation topics for one resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "InterviewInfo", default)]
    pub interview_info: InterviewInfo,
    #[serde(rename = "Formate Resume", default)]
    pub formatted_resume: FormattedResume,
}

/// Five interview areas and one description per area, in the same order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewInfo {
    #[serde(default)]
    pub areas: Vec<String>,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

impl InterviewInfo {
    pub const AREA_COUNT: usize = 5;

    /// Pairs each area with its description. Stops at the shorter list.
    pub fn topics(&self) -> impl Iterator<Item = (&str, &str)> {
        self.areas
            .iter()
            .map(String::as_str)
            .zip(self.subtopics.iter().map(String::as_str))
    }

    pub fn is_complete(&self) -> bool {
        self.areas.len() == Self::AREA_COUNT && self.subtopics.len() == Self::AREA_COUNT
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattedResume {
    #[serde(rename = "FullName", default, deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(rename = "Designation", default, deserialize_with = "lenient_string")]
    pub designation: String,
    #[serde(
        rename = "Years of experience",
        default,
        deserialize_with = "lenient_number"
    )]
    pub years_of_experience: f64,
    #[serde(rename = "Educations", default)]
    pub educations: Vec<Education>,
    #[serde(rename = "Skills", default)]
    pub skills: Vec<String>,
    #[serde(rename = "Experience", default)]
    pub experience: Vec<Experience>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(rename = "UniversityName", default, deserialize_with = "lenient_string")]
    pub university_name: String,
    #[serde(rename = "Course", default, deserialize_with = "lenient_string")]
    pub course: String,
    #[serde(rename = "Year", default)]
    pub year: YearRange,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(rename = "OrgName", default, deserialize_with = "lenient_string")]
    pub org_name: String,
    #[serde(rename = "Year", default)]
    pub year: YearRange,
    #[serde(rename = "Designation", default, deserialize_with = "lenient_string")]
    pub designation: String,
}

/// `[start_year, end_year]`. Entries that are not a year (`"Present"`, `null`)
/// are kept as `None` instead of failing the whole reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearRange {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

#[cfg(test)]
impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

impl Serialize for YearRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.start)?;
        seq.serialize_element(&self.end)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for YearRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let range = match value {
            Value::Array(items) => {
                let mut years = items.iter().map(year_from_value);
                YearRange {
                    start: years.next().flatten(),
                    end: years.next().flatten(),
                }
            }
            // A single year stands for both ends.
            other => {
                let year = year_from_value(&other);
                YearRange {
                    start: year,
                    end: year,
                }
            }
        };
        Ok(range)
    }
}

fn year_from_value(value: &Value) -> Option<i32> {
    let year = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    year.and_then(|y| i32::try_from(y).ok())
}

// ────────────────────────────────────────────────────────────────────────────
// ATS scoring
// ────────────────────────────────────────────────────────────────────────────

/// Which document the ATS prompt evaluates. The fourth scoring category differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// An AI-generated profile summary; fourth category is summary clarity.
    #[default]
    Summary,
    /// A full resume document; fourth category is formatting and clarity.
    Resume,
}

impl ScoringMode {
    /// `"summary"` (any case) selects summary mode; every other flag means a full resume.
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("summary") {
            ScoringMode::Summary
        } else {
            ScoringMode::Resume
        }
    }

    /// Key of the fourth category in the zero-score default.
    pub fn clarity_category(self) -> &'static str {
        match self {
            ScoringMode::Summary => "summary",
            ScoringMode::Resume => "formatting",
        }
    }
}

/// Target seniority: a number of years or a free-form band such as `"II"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExperienceLevel {
    Years(f64),
    Label(String),
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperienceLevel::Years(years) => write!(f, "{years}"),
            ExperienceLevel::Label(label) => f.write_str(label),
        }
    }
}

impl ExperienceLevel {
    /// Interprets form input: numbers become `Years`, anything else stays a label.
    pub fn from_input(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<f64>() {
            Ok(years) if years.is_finite() => ExperienceLevel::Years(years),
            _ => ExperienceLevel::Label(raw.to_string()),
        }
    }
}

impl From<u32> for ExperienceLevel {
    fn from(years: u32) -> Self {
        ExperienceLevel::Years(f64::from(years))
    }
}

impl From<&str> for ExperienceLevel {
    fn from(label: &str) -> Self {
        ExperienceLevel::Label(label.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtsScoreResult {
    /// 0 – 100
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_score: f64,
    /// skills 0–40, experience 0–30, education 0–15, clarity 0–15
    #[serde(default, deserialize_with = "lenient_scores")]
    pub category_scores: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub feedback: String,
}

impl AtsScoreResult {
    pub const SKILLS: &'static str = "skills";
    pub const EXPERIENCE: &'static str = "experience";
    pub const EDUCATION: &'static str = "education";

    /// All-zero result carrying `feedback` as the explanation.
    pub fn zero(mode: ScoringMode, feedback: impl Into<String>) -> Self {
        let category_scores = [
            Self::SKILLS,
            Self::EXPERIENCE,
            Self::EDUCATION,
            mode.clarity_category(),
        ]
        .into_iter()
        .map(|key| (key.to_string(), 0.0))
        .collect();

        Self {
            total_score: 0.0,
            category_scores,
            feedback: feedback.into(),
        }
    }

    pub fn category_sum(&self) -> f64 {
        self.category_scores.values().sum()
    }

    /// Whether the categories add up to the total within `tolerance` points.
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        (self.category_sum() - self.total_score).abs() <= tolerance
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field deserializers
// ────────────────────────────────────────────────────────────────────────────

/// Accepts a number, or a string whose leading token is a number (`"30"`, `"30/40"`, `"12 points"`).
fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let token: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            token.parse::<f64>().ok()
        }
        _ => None,
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value).unwrap_or_default())
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn lenient_scores<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, f64>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| {
                let score = number_from_value(&value).unwrap_or_default();
                (key, score)
            })
            .collect()),
        Value::Null => Ok(BTreeMap::new()),
        other => Err(de::Error::invalid_type(
            de::Unexpected::Other(&other.to_string()),
            &"an object of category scores",
        )),
    }
}
