//! Resume analysis entry points.
//!
//! Failure policy, applied the same way to both entry points:
//! - a reply without a usable JSON object is replaced by the mode's default result;
//! - `process_resume` surfaces document and LLM failures as `AnalysisError`;
//! - `score_resume` / `score_document` never fail: any error becomes a zero score
//!   whose `feedback` carries the message, so a zero score must be read together
//!   with its feedback.

pub mod handlers;
pub mod models;
pub mod prompts;
pub mod response;

use bytes::Bytes;
use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::models::{AnalysisResult, AtsScoreResult, ExperienceLevel, ScoringMode};
use crate::analysis::prompts::{analysis_prompt, ats_prompt};
use crate::analysis::response::parse_response;
use crate::document::{self, DocumentError, ExtractedDocument};
use crate::llm_client::{ChatModel, LlmError};

/// Points of slack allowed between the category sum and the total before logging.
const SCORE_SUM_TOLERANCE: f64 = 5.0;

pub const PARSE_FAILURE_FEEDBACK: &str = "JSON parsing failed. Default score assigned.";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Text extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Detects the format and extracts text on the blocking pool.
pub async fn extract_document(data: Bytes) -> Result<ExtractedDocument, AnalysisError> {
    let extracted = tokio::task::spawn_blocking(move || document::extract_text(&data)).await??;
    if extracted.text.trim().is_empty() {
        warn!(
            "{} document produced no text; it may be a scanned image",
            extracted.document_type
        );
    }
    Ok(extracted)
}

/// Extracts a resume and runs the comprehensive-analysis prompt on it.
///
/// Unsupported formats stop here; their error text is never sent to the model.
pub async fn process_resume(
    llm: &dyn ChatModel,
    data: Bytes,
) -> Result<AnalysisResult, AnalysisError> {
    let extracted = extract_document(data).await?;
    analyze_text(llm, &extracted.text, Local::now().date_naive()).await
}

/// Runs the comprehensive-analysis prompt on already-extracted resume text.
/// `today` feeds the years-of-experience calculation at month granularity.
pub async fn analyze_text(
    llm: &dyn ChatModel,
    resume_text: &str,
    today: NaiveDate,
) -> Result<AnalysisResult, AnalysisError> {
    let current_date = today.format("%Y-%m").to_string();
    let prompt = analysis_prompt(resume_text, &current_date);

    let reply = llm.complete(&prompt.system, &prompt.user).await?;

    let result = match parse_response::<AnalysisResult>(&reply) {
        Ok(result) => result,
        Err(e) => {
            warn!("Analysis reply unusable, returning placeholder profile: {e}");
            AnalysisResult::default()
        }
    };

    for (area, subtopic) in result.interview_info.topics() {
        debug!("Interview area '{area}': {subtopic}");
    }
    if !result.interview_info.is_complete() {
        warn!(
            "Expected {} interview areas with descriptions, got {} areas and {} descriptions",
            models::InterviewInfo::AREA_COUNT,
            result.interview_info.areas.len(),
            result.interview_info.subtopics.len()
        );
    }

    info!(
        "Resume analysed: {} skills, {} experience entries",
        result.formatted_resume.skills.len(),
        result.formatted_resume.experience.len()
    );

    Ok(result)
}

/// Scores resume text (or a generated summary) against a job role. Never fails.
pub async fn score_resume(
    llm: &dyn ChatModel,
    resume_text: &str,
    job_role: &str,
    experience_level: &ExperienceLevel,
    mode: ScoringMode,
) -> AtsScoreResult {
    match try_score(llm, resume_text, job_role, experience_level, mode).await {
        Ok(result) => result,
        Err(e) => {
            warn!("ATS scoring failed for '{job_role}': {e}");
            AtsScoreResult::zero(mode, format!("Error in ATS scoring: {e}"))
        }
    }
}

/// Extracts an uploaded resume and scores it as a full document. Never fails.
pub async fn score_document(
    llm: &dyn ChatModel,
    data: Bytes,
    job_role: &str,
    experience_level: &ExperienceLevel,
) -> AtsScoreResult {
    let mode = ScoringMode::Resume;
    match extract_document(data).await {
        Ok(extracted) => {
            score_resume(llm, &extracted.text, job_role, experience_level, mode).await
        }
        Err(e) => {
            warn!("ATS scoring skipped, document unreadable: {e}");
            AtsScoreResult::zero(mode, format!("Error in ATS scoring: {e}"))
        }
    }
}

async fn try_score(
    llm: &dyn ChatModel,
    resume_text: &str,
    job_role: &str,
    experience_level: &ExperienceLevel,
    mode: ScoringMode,
) -> Result<AtsScoreResult, AnalysisError> {
    let prompt = ats_prompt(resume_text, job_role, experience_level, mode);
    let reply = llm.complete(&prompt.system, &prompt.user).await?;

    let result = match parse_response::<AtsScoreResult>(&reply) {
        Ok(result) => result,
        Err(e) => {
            warn!("ATS reply unusable, assigning default score: {e}");
            return Ok(AtsScoreResult::zero(mode, PARSE_FAILURE_FEEDBACK));
        }
    };

    if !result.is_consistent(SCORE_SUM_TOLERANCE) {
        warn!(
            "Category scores sum to {} but total_score is {}",
            result.category_sum(),
            result.total_score
        );
    }
    info!("ATS score for '{job_role}': {}", result.total_score);

    Ok(result)
}


#[cfg(test)]
mod tests {
    use super::testing::MockChatModel;
    use super::*;
    use crate::document::fixtures::{docx_with_body, pdf_with_text};
    use crate::document::DocumentType;

    const SUMMARY: &str = "Data scientist with two years of experience building churn models. \
        Comfortable with Python, SQL and stakeholder communication.";

    const ANALYSIS_REPLY: &str = r#"```json
{
  "InterviewInfo": {
    "areas": ["Python", "SQL", "Statistics", "Machine Learning", "Communication"],
    "subtopics": ["Idioms", "Window functions", "Inference", "Model evaluation", "Storytelling"]
  },
  "Formate Resume": {
    "FullName": "Nishant Kumar",
    "Designation": "Data Scientist",
    "Years of experience": 2.4,
    "Educations": [{"UniversityName": "NIT Patna", "Course": "B.Tech", "Year": [2017, 2021]}],
    "Skills": ["Python", "SQL"],
    "Experience": [{"OrgName": "Fintech Co", "Year": [2022, 2024], "Designation": "Data Scientist"}]
  }
}
```"#;

    fn june_2026() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    #[tokio::test]
    async fn test_summary_mode_scenario() {
        let llm = MockChatModel::replying(
            "Here you go: {\"total_score\": 72, \"category_scores\": {\"skills\":30,\"experience\":20,\"education\":12,\"summary\":10}, \"feedback\": \"solid\"}",
        );
        let result = score_resume(
            &llm,
            SUMMARY,
            "Data Scientist",
            &ExperienceLevel::from(2u32),
            ScoringMode::from_flag("summary"),
        )
        .await;

        assert_eq!(result.total_score, 72.0);
        assert_eq!(result.feedback, "solid");
        assert_eq!(result.category_scores["summary"], 10.0);
        assert!(llm.last_user_prompt().contains("Applicant Summary: Data scientist"));
    }

    #[tokio::test]
    async fn test_scoring_network_failure_becomes_zero_score() {
        let llm = MockChatModel::failing(503, "connection reset by peer");
        let result = score_resume(
            &llm,
            SUMMARY,
            "Data Scientist",
            &ExperienceLevel::from("II"),
            ScoringMode::Resume,
        )
        .await;

        assert_eq!(result.total_score, 0.0);
        assert_eq!(result.category_scores.len(), 4);
        assert!(result.category_scores.values().all(|v| *v == 0.0));
        assert!(result.feedback.starts_with("Error in ATS scoring:"));
        assert!(result.feedback.contains("connection reset by peer"));
    }

    #[tokio::test]
    async fn test_scoring_reply_without_json_gets_default() {
        let llm = MockChatModel::replying("I am unable to evaluate this resume.");
        let result = score_resume(
            &llm,
            SUMMARY,
            "Analyst",
            &ExperienceLevel::from(1u32),
            ScoringMode::Summary,
        )
        .await;

        assert_eq!(result, AtsScoreResult::zero(ScoringMode::Summary, PARSE_FAILURE_FEEDBACK));
    }

    #[tokio::test]
    async fn test_analyze_text_parses_fenced_reply() {
        let llm = MockChatModel::replying(ANALYSIS_REPLY);
        let result = analyze_text(&llm, "Nishant Kumar ...", june_2026()).await.unwrap();

        assert!(result.interview_info.is_complete());
        assert_eq!(result.formatted_resume.full_name, "Nishant Kumar");
        assert_eq!(result.formatted_resume.educations.len(), 1);
        assert!(llm.last_user_prompt().contains("- Current Date: 2026-06"));
    }

    #[tokio::test]
    async fn test_analyze_text_without_json_returns_placeholder() {
        let llm = MockChatModel::replying("Sorry, the resume appears to be empty.");
        let result = analyze_text(&llm, "", june_2026()).await.unwrap();
        assert_eq!(result, AnalysisResult::default());
    }

    #[tokio::test]
    async fn test_analyze_text_surfaces_llm_failure() {
        let llm = MockChatModel::failing(401, "Incorrect API key provided");
        let err = analyze_text(&llm, "resume", june_2026()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Llm(LlmError::Api { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_process_resume_sends_docx_text_to_model() {
        let llm = MockChatModel::replying(ANALYSIS_REPLY);
        let data = docx_with_body(
            "<w:p><w:r><w:t>Nishant Kumar</w:t></w:r></w:p><w:p><w:r><w:t>Data Scientist</w:t></w:r></w:p>",
        );

        let result = process_resume(&llm, Bytes::from(data)).await.unwrap();
        assert_eq!(result.formatted_resume.designation, "Data Scientist");
        assert!(llm
            .last_user_prompt()
            .contains("- Raw Resume: Nishant Kumar\nData Scientist"));
    }

    #[tokio::test]
    async fn test_process_resume_sends_pdf_text_to_model() {
        let llm = MockChatModel::replying(ANALYSIS_REPLY);
        let data = pdf_with_text("Ada Lovelace");

        process_resume(&llm, Bytes::from(data)).await.unwrap();

        assert_eq!(llm.call_count(), 1);
        assert!(llm.last_user_prompt().contains("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_process_resume_rejects_unsupported_without_calling_model() {
        let llm = MockChatModel::replying(ANALYSIS_REPLY);
        let err = process_resume(&llm, Bytes::from_static(b"\x00\x01\x02\x03"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::Document(DocumentError::UnsupportedFormat(DocumentType::Unknown))
        ));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_score_document_scores_in_resume_mode() {
        let llm = MockChatModel::replying(
            r#"{"total_score": 55, "category_scores": {"skills": 20, "experience": 15, "education": 10, "formatting": 10}, "feedback": "average"}"#,
        );
        let data = docx_with_body("<w:p><w:r><w:t>HR Administrator</w:t></w:r></w:p>");

        let result = score_document(
            &llm,
            Bytes::from(data),
            "HR ADMINISTRATOR/MARKETING ASSOCIATE",
            &ExperienceLevel::from("II"),
        )
        .await;

        assert_eq!(result.total_score, 55.0);
        let (system, user) = llm.calls.lock().unwrap()[0].clone();
        assert!(system.contains("Resume formatting and clarity"));
        assert!(user.ends_with("Resume: HR Administrator"));
    }

    #[tokio::test]
    async fn test_score_document_unsupported_is_zero_score() {
        let llm = MockChatModel::replying("{}");
        let mut doc = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        doc.extend_from_slice(&[0u8; 64]);

        let result = score_document(&llm, Bytes::from(doc), "Analyst", &ExperienceLevel::from(3u32)).await;

        assert_eq!(result.total_score, 0.0);
        assert!(result.category_scores.contains_key("formatting"));
        assert!(result.feedback.contains("Unsupported document format: DOC"));
        assert_eq!(llm.call_count(), 0);
    }
}
