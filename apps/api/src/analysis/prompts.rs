// All LLM prompt templates for resume analysis and ATS scoring.
// Placeholders are replaced with `str::replace`; resume text is always substituted
// last so its contents can never be mistaken for a placeholder.

use crate::analysis::models::{ExperienceLevel, ScoringMode};

/// A system message and a user message, ready for one chat-completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// System prompt for comprehensive resume analysis.
pub const ANALYSIS_SYSTEM: &str = "You are an expert HR analyst and career coach. \
    Your task is to process a raw text resume and extract structured details, \
    then generate 5 core areas for interview assessment.";

/// Comprehensive analysis prompt. Replace `{current_date}` and `{resume_text}`.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"### Input:
- Raw Resume: {resume_text}
- Current Date: {current_date}

### Output:
Return a **valid JSON** in the following structure:

{
  "InterviewInfo": {
    "areas": ["area1", "area2", "area3", "area4", "area5"],
    "subtopics": ["Desc1", "Desc2", "Desc3", "Desc4", "Desc5"]
  },
  "Formate Resume": {
    "FullName": string,
    "Designation": string,
    "Years of experience": float,
    "Educations": [
      {"UniversityName": string, "Course": string, "Year": [start_year, end_year]}
    ],
    "Skills": ["skill1", "skill2", ...],
    "Experience": [
      {"OrgName": string, "Year": [start_year, end_year], "Designation": string}
    ]
  }
}

### Rules:
1. Extract details accurately from the raw resume.
2. Use the current date to calculate total years of experience.
3. For "InterviewInfo", choose 5 areas relevant to the candidate's domain and experience.
4. Provide a short description for every area in "subtopics", in the same order as "areas".
5. Return only **valid JSON** without extra text."#;

const ATS_SCORE_SHAPE: &str = r#"
"total_score": numeric value between 0 to 100
"category_scores": {
    Relevant skills and technologies (0 to 40 points),
    Experience matching the job role (0 to 30 points),
    Education and certifications (0 to 15 points),
    {clarity_category} (0 to 15 points)
}
"feedback": brief feedback explaining the score"#;

/// System prompt preamble for scoring an AI-generated profile summary.
pub const ATS_SUMMARY_SYSTEM: &str =
    "You are an ATS system, you just have to answer json structured output of resume score";

/// System prompt preamble for scoring a full resume document.
pub const ATS_RESUME_SYSTEM: &str =
    "You are an ATS system evaluator for resume. you just have to answer json structured output of resume score";

/// Replace `{job_role}`, `{experience_level}`, `{resume_text}`.
pub const ATS_SUMMARY_PROMPT_TEMPLATE: &str = "evaluate the following **AI-generated LinkedIn applicant summary** \
    for a {job_role} position with {experience_level} experience level.\n\nApplicant Summary: {resume_text}";

/// Replace `{job_role}`, `{experience_level}`, `{resume_text}`.
pub const ATS_RESUME_PROMPT_TEMPLATE: &str = "evaluate the following resume for a {job_role} position \
    with {experience_level} experience level.\n\nResume: {resume_text}";

/// Builds the comprehensive-analysis prompt. `current_date` is a `YYYY-MM` stamp.
pub fn analysis_prompt(resume_text: &str, current_date: &str) -> PromptPair {
    let user = ANALYSIS_PROMPT_TEMPLATE
        .replace("{current_date}", current_date)
        .replace("{resume_text}", resume_text);

    PromptPair {
        system: ANALYSIS_SYSTEM.to_string(),
        user,
    }
}

/// Builds the ATS scoring prompt for the given mode.
pub fn ats_prompt(
    resume_text: &str,
    job_role: &str,
    experience_level: &ExperienceLevel,
    mode: ScoringMode,
) -> PromptPair {
    let (preamble, clarity_category, template) = match mode {
        ScoringMode::Summary => (
            ATS_SUMMARY_SYSTEM,
            "Summary clarity and completeness",
            ATS_SUMMARY_PROMPT_TEMPLATE,
        ),
        ScoringMode::Resume => (
            ATS_RESUME_SYSTEM,
            "Resume formatting and clarity",
            ATS_RESUME_PROMPT_TEMPLATE,
        ),
    };

    let system = format!(
        "{preamble}\n{}",
        ATS_SCORE_SHAPE.replace("{clarity_category}", clarity_category)
    );
    let user = template
        .replace("{job_role}", job_role.trim())
        .replace("{experience_level}", &experience_level.to_string())
        .replace("{resume_text}", resume_text);

    PromptPair { system, user }
}
