use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{CourseData, Error, Result};

const API_ROOT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// A raw syllabus upload, as received from the user.
#[derive(Debug, Clone)]
pub struct SyllabusDocument {
    /// Original file name, used for MIME type guessing
    pub file_name: String,
    /// Raw document bytes
    pub bytes: Vec<u8>,
}

impl SyllabusDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// MIME type guessed from the file extension, defaulting to PDF.
    pub fn mime_type(&self) -> &'static str {
        match self
            .file_name
            .rsplit('.')
            .next()
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("txt") => "text/plain",
            Some("md") => "text/markdown",
            Some("html") | Some("htm") => "text/html",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            _ => "application/pdf",
        }
    }
}

/// Semester window supplied by the user alongside the upload; interpolated
/// into the extraction prompt so the model can resolve relative dates.
#[derive(Debug, Clone)]
pub struct SemesterWindow {
    /// Semester start, YYYY-MM-DD
    pub start_date: String,
    /// Semester end, YYYY-MM-DD
    pub end_date: String,
}

/// The upstream document-extraction collaborator.
///
/// Implementations turn raw syllabus bytes into structured [`CourseData`];
/// the scheduling core never parses document text itself.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extractor name
    fn name(&self) -> &str;

    /// Extracts structured course data from a syllabus document.
    async fn extract(
        &self,
        document: &SyllabusDocument,
        window: &SemesterWindow,
    ) -> Result<CourseData>;
}

/// Gemini-backed extractor using the generateContent REST endpoint with a
/// JSON-schema-constrained response.
pub struct GeminiExtractor {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiExtractor {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("coursecal/0.1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Builds an extractor from `GEMINI_API_KEY` and optional
    /// `GEMINI_MODEL`. A missing key is a hard configuration error: the
    /// pipeline cannot degrade without its extraction collaborator.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| Error::Config("GEMINI_API_KEY environment variable is required".into()))?;
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    fn build_prompt(window: &SemesterWindow) -> String {
        format!(
            "Extract course data from this syllabus into strict JSON.\n\
             \n\
             CONTEXT:\n\
             - Semester Start: {}\n\
             - Semester End: {}\n\
             \n\
             INSTRUCTIONS:\n\
             1. **School**: Extract the university name.\n\
             2. **Lectures**: Split multiple days into separate objects. Find the address.\n\
             3. **Exams & Quizzes (CRITICAL)**:\n\
                - If an exam has a specific TIME WINDOW (e.g., \"Midterm: Oct 15, 7:00 PM - 9:00 PM\"), you MUST fill in:\n\
                  * `exam_date`: \"2025-10-15\"\n\
                  * `start_time`: \"19:00\"\n\
                  * `end_time`: \"21:00\"\n\
                - Do NOT put this in `due_date`. `due_date` is only for homework deadlines.\n\
             4. **Assignments**: If an item repeats, set `recurring=true`.",
            window.start_date, window.end_date
        )
    }

    fn request_body(document: &SyllabusDocument, window: &SemesterWindow) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": document.mime_type(),
                            "data": BASE64.encode(&document.bytes),
                        }
                    },
                    { "text": Self::build_prompt(window) },
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": Self::response_schema(),
            }
        })
    }

    /// Response schema forcing the model into the [`CourseData`] shape.
    fn response_schema() -> Value {
        let lecture = json!({
            "type": "OBJECT",
            "properties": {
                "day": { "type": "STRING" },
                "start_time": { "type": "STRING" },
                "end_time": { "type": "STRING" },
                "building": { "type": "STRING", "nullable": true },
                "room": { "type": "STRING", "nullable": true },
                "section": { "type": "STRING", "nullable": true },
                "full_address": { "type": "STRING", "nullable": true },
            },
            "required": ["day", "start_time", "end_time"],
        });
        let assignment = json!({
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "type": { "type": "STRING" },
                "due_date": { "type": "STRING", "nullable": true },
                "exam_date": { "type": "STRING", "nullable": true },
                "start_time": { "type": "STRING", "nullable": true },
                "end_time": { "type": "STRING", "nullable": true },
                "details": { "type": "STRING", "nullable": true },
                "location": { "type": "STRING", "nullable": true },
                "recurring": { "type": "BOOLEAN" },
                "recurring_day": { "type": "STRING", "nullable": true },
                "recurring_time": { "type": "STRING", "nullable": true },
            },
            "required": ["title", "type"],
        });
        json!({
            "type": "OBJECT",
            "properties": {
                "school_name": { "type": "STRING" },
                "course_code": { "type": "STRING" },
                "course_name": { "type": "STRING" },
                "semester_start": { "type": "STRING" },
                "semester_end": { "type": "STRING" },
                "lectures": { "type": "ARRAY", "items": lecture },
                "assignments": { "type": "ARRAY", "items": assignment },
            },
            "required": [
                "school_name",
                "course_code",
                "course_name",
                "semester_start",
                "semester_end",
                "lectures",
                "assignments",
            ],
        })
    }
}

#[async_trait]
impl Extractor for GeminiExtractor {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn extract(
        &self,
        document: &SyllabusDocument,
        window: &SemesterWindow,
    ) -> Result<CourseData> {
        tracing::info!(
            file = %document.file_name,
            model = %self.model,
            "extracting course data"
        );

        let url = format!("{}/models/{}:generateContent", API_ROOT, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(document, window))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Extraction(format!(
                "extraction service returned HTTP {}: {}",
                status, body
            )));
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| {
                content.parts.into_iter().find_map(|part| part.text)
            })
            .ok_or_else(|| {
                Error::Extraction("extraction service returned no JSON candidate".into())
            })?;

        let data: CourseData = serde_json::from_str(&text).map_err(|e| {
            Error::Extraction(format!("extraction response is not valid course data: {}", e))
        })?;

        tracing::info!(
            lectures = data.lectures.len(),
            assignments = data.assignments.len(),
            "extraction complete"
        );
        Ok(data)
    }
}

/// generateContent response envelope, reduced to the fields consumed here
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_guessing() {
        assert_eq!(
            SyllabusDocument::new("syllabus.pdf", vec![]).mime_type(),
            "application/pdf"
        );
        assert_eq!(
            SyllabusDocument::new("notes.TXT", vec![]).mime_type(),
            "text/plain"
        );
        // Unknown extensions default to PDF
        assert_eq!(
            SyllabusDocument::new("syllabus", vec![]).mime_type(),
            "application/pdf"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let document = SyllabusDocument::new("cs2500.pdf", b"%PDF-1.4".to_vec());
        let window = SemesterWindow {
            start_date: "2025-09-02".to_string(),
            end_date: "2025-12-15".to_string(),
        };
        let body = GeminiExtractor::request_body(&document, &window);

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[0]["inlineData"]["data"], BASE64.encode(b"%PDF-1.4"));
        let prompt = parts[1]["text"].as_str().unwrap();
        assert!(prompt.contains("Semester Start: 2025-09-02"));
        assert!(prompt.contains("Semester End: 2025-12-15"));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_response_schema_matches_course_data() {
        let schema = GeminiExtractor::response_schema();
        let text = json!({
            "school_name": "Northeastern University",
            "course_code": "CS 2500",
            "course_name": "Fundamentals of Computer Science",
            "semester_start": "2025-09-02",
            "semester_end": "2025-12-15",
            "lectures": [],
            "assignments": [{ "title": "HW 1", "type": "Homework" }],
        })
        .to_string();

        // Every field the schema requires must deserialize into CourseData
        for required in schema["required"].as_array().unwrap() {
            assert!(schema["properties"][required.as_str().unwrap()].is_object());
        }
        let data: CourseData = serde_json::from_str(&text).unwrap();
        assert_eq!(data.course_code, "CS 2500");
        assert_eq!(data.assignments.len(), 1);
        assert!(!data.assignments[0].recurring);
    }
}
