//! Axum route handlers for the Resume API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::analysis::models::{AnalysisResult, AtsScoreResult, ExperienceLevel, ScoringMode};
use crate::analysis::{extract_document, process_resume, score_document, score_resume};
use crate::document::ExtractedDocument;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AtsScoreRequest {
    pub resume_text: String,
    pub job_role: String,
    pub experience_level: ExperienceLevel,
    /// `"summary"` (default) or anything else for a full resume.
    #[serde(default)]
    pub mode: Option<String>,
}

/// Fields collected from a multipart upload.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<Bytes>,
    job_role: Option<String>,
    experience_level: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("Unreadable file: {e}")))?;
                    form.file = Some(data);
                }
                "job_role" | "experience_level" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Unreadable {name}: {e}")))?;
                    if name == "job_role" {
                        form.job_role = Some(value);
                    } else {
                        form.experience_level = Some(value);
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn require_file(&mut self) -> Result<Bytes, AppError> {
        match self.file.take() {
            Some(data) if !data.is_empty() => Ok(data),
            _ => Err(AppError::Validation(
                "multipart field 'file' is required".to_string(),
            )),
        }
    }
}

fn require_text(value: Option<&str>, field: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::Validation(format!("{field} cannot be empty"))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/extract
///
/// Detects the uploaded document's format and returns its plain text.
pub async fn handle_extract(multipart: Multipart) -> Result<Json<ExtractedDocument>, AppError> {
    let data = UploadForm::read(multipart).await?.require_file()?;
    let extracted = extract_document(data).await?;
    Ok(Json(extracted))
}

/// POST /api/v1/resumes/analyze
///
/// Full pipeline: detect → extract → comprehensive-analysis prompt → parsed profile.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let data = UploadForm::read(multipart).await?.require_file()?;
    let result = process_resume(state.llm.as_ref(), data).await?;
    Ok(Json(result))
}

/// POST /api/v1/resumes/ats-score
///
/// Scores resume text or a generated summary. Scoring failures come back as a
/// zero score with an explanation in `feedback`, not as an error status.
pub async fn handle_ats_score(
    State(state): State<AppState>,
    Json(request): Json<AtsScoreRequest>,
) -> Result<Json<AtsScoreResult>, AppError> {
    let resume_text = require_text(Some(&request.resume_text), "resume_text")?;
    let job_role = require_text(Some(&request.job_role), "job_role")?;
    let mode = request
        .mode
        .as_deref()
        .map(ScoringMode::from_flag)
        .unwrap_or_default();

    let result = score_resume(
        state.llm.as_ref(),
        &resume_text,
        &job_role,
        &request.experience_level,
        mode,
    )
    .await;

    Ok(Json(result))
}

/// POST /api/v1/resumes/ats-score/upload
///
/// Extracts an uploaded resume and scores it as a full document.
pub async fn handle_ats_score_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AtsScoreResult>, AppError> {
    let mut form = UploadForm::read(multipart).await?;
    let data = form.require_file()?;
    let job_role = require_text(form.job_role.as_deref(), "job_role")?;
    let experience_level = ExperienceLevel::from_input(&require_text(
        form.experience_level.as_deref(),
        "experience_level",
    )?);

    let result = score_document(state.llm.as_ref(), data, &job_role, &experience_level).await;

    Ok(Json(result))
}
