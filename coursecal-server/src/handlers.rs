use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use coursecal_core::{
    ReminderConfig, TimezoneConfig,
    extract::{Extractor, GeminiExtractor, SemesterWindow, SyllabusDocument},
    ics::IcsGenerator,
    schedule::ScheduleCompiler,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<GeminiExtractor>,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Multipart fields of the calendar generation request
#[derive(Default)]
struct GenerateCalendarForm {
    file: Option<SyllabusDocument>,
    start_date: Option<String>,
    end_date: Option<String>,
    lecture_reminder: Option<u32>,
    exam_reminder: Option<u32>,
    assignment_reminder: Option<u32>,
    school_timezone: Option<String>,
    user_timezone: Option<String>,
}

pub fn create_app() -> Result<Router, coursecal_core::Error> {
    let extractor = Arc::new(GeminiExtractor::from_env()?);
    let state = AppState { extractor };

    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/generate-calendar", post(generate_calendar_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    Ok(router)
}

/// Root handler
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Coursecal Calendar Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Syllabus to ICS calendar generation service",
        "endpoints": {
            "health": "/health",
            "generate_calendar": "/generate-calendar"
        }
    }))
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Calendar generation handler: syllabus upload in, ICS stream out
async fn generate_calendar_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(multipart).await?;

    let document = form
        .file
        .ok_or_else(|| config_error("missing 'file' field"))?;
    let window = SemesterWindow {
        start_date: form
            .start_date
            .ok_or_else(|| config_error("missing 'start_date' field"))?,
        end_date: form
            .end_date
            .ok_or_else(|| config_error("missing 'end_date' field"))?,
    };
    let reminders = ReminderConfig {
        lecture: form
            .lecture_reminder
            .ok_or_else(|| config_error("missing 'lecture_reminder' field"))?,
        exam: form
            .exam_reminder
            .ok_or_else(|| config_error("missing 'exam_reminder' field"))?,
        assignment: form
            .assignment_reminder
            .ok_or_else(|| config_error("missing 'assignment_reminder' field"))?,
    };
    let timezones = TimezoneConfig {
        school: form.school_timezone,
        user: form.user_timezone,
    };

    tracing::info!(file = %document.file_name, "processing syllabus upload");

    let data = state.extractor.extract(&document, &window).await?;

    let compiler = ScheduleCompiler::new(reminders, &timezones);
    let compiled = compiler.compile(&data)?;
    for note in &compiled.dropped {
        tracing::warn!(note = %note, "entry dropped during compilation");
    }

    let generator = IcsGenerator::new(Some(format!("{} Schedule", data.course_code)));
    let ics_content = generator.generate(&compiled.events)?;

    Ok((
        StatusCode::OK,
        [
            ("Content-Type", "text/calendar; charset=utf-8".to_string()),
            (
                "Content-Disposition",
                "attachment; filename=syllabus_schedule.ics".to_string(),
            ),
            ("X-Coursecal-Dropped", compiled.dropped.len().to_string()),
        ],
        ics_content,
    )
        .into_response())
}

async fn read_form(mut multipart: Multipart) -> Result<GenerateCalendarForm, AppError> {
    let mut form = GenerateCalendarForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| config_error(format!("invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .unwrap_or("syllabus.pdf")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| config_error(format!("failed to read upload: {}", e)))?;
                form.file = Some(SyllabusDocument::new(file_name, bytes.to_vec()));
            }
            "start_date" => form.start_date = Some(text_field(field, &name).await?),
            "end_date" => form.end_date = Some(text_field(field, &name).await?),
            "lecture_reminder" => form.lecture_reminder = Some(minutes_field(field, &name).await?),
            "exam_reminder" => form.exam_reminder = Some(minutes_field(field, &name).await?),
            "assignment_reminder" => {
                form.assignment_reminder = Some(minutes_field(field, &name).await?);
            }
            "school_timezone" => form.school_timezone = Some(text_field(field, &name).await?),
            "user_timezone" => form.user_timezone = Some(text_field(field, &name).await?),
            _ => {
                tracing::debug!(field = %name, "ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

async fn text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| config_error(format!("invalid '{}' field: {}", name, e)))
}

async fn minutes_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<u32, AppError> {
    let text = text_field(field, name).await?;
    text.trim()
        .parse::<u32>()
        .map_err(|_| config_error(format!("'{}' must be a non-negative minute count", name)))
}

fn config_error(message: impl Into<String>) -> AppError {
    AppError(coursecal_core::Error::Config(message.into()))
}

/// Application error type
#[derive(Debug)]
struct AppError(coursecal_core::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self.0 {
            coursecal_core::Error::Config(_) => (StatusCode::BAD_REQUEST, "invalid request"),
            coursecal_core::Error::Extraction(_) | coursecal_core::Error::Http(_) => {
                (StatusCode::BAD_GATEWAY, "extraction failed")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            message: self.0.to_string(),
        });

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<coursecal_core::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
