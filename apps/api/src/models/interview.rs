use serde::{Deserialize, Serialize};

/// Interview settings captured once at session start. Never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterviewConfig {
    pub company: String,
    pub position: String,
    pub interview_type: Option<String>,
    /// Plain text extracted from the uploaded resume, if any.
    pub resume_text: Option<String>,
    /// Plain text extracted from the uploaded job description, if any.
    pub job_description_text: Option<String>,
}
