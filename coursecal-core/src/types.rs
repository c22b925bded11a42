use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Structured course data delivered by the extraction collaborator.
///
/// The core never sees raw syllabus bytes; this is the full input contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseData {
    /// University name
    pub school_name: String,
    /// Course code, e.g. "CS 2500"
    pub course_code: String,
    /// Course name
    pub course_name: String,
    /// Semester start date, e.g. "2025-09-02"
    pub semester_start: String,
    /// Semester end date
    pub semester_end: String,
    /// Weekly lecture meetings
    #[serde(default)]
    pub lectures: Vec<Lecture>,
    /// Assignments, quizzes and exams
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// One lecture meeting pattern.
///
/// `day` is free text and may encode several weekdays ("Mon/Wed", "TuTh").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecture {
    /// Free-text day specifier
    pub day: String,
    /// Start time-of-day, free text
    pub start_time: String,
    /// End time-of-day, free text
    pub end_time: String,
    /// Building name
    #[serde(default)]
    pub building: Option<String>,
    /// Room number
    #[serde(default)]
    pub room: Option<String>,
    /// Section label
    #[serde(default)]
    pub section: Option<String>,
    /// Full street address, preferred over building when present
    #[serde(default)]
    pub full_address: Option<String>,
}

/// One assignment, quiz or exam entry.
///
/// The temporal fields are priority-ordered alternatives, not independent
/// flags: a timed exam window (`exam_date` + `start_time`) beats a weekly
/// rule (`recurring` + `recurring_day`), which beats a single `due_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Display title
    pub title: String,
    /// Free-text type label ("Homework", "Midterm Exam", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Absolute deadline, date or date-time
    #[serde(default)]
    pub due_date: Option<String>,
    /// Exam date for a fixed time window
    #[serde(default)]
    pub exam_date: Option<String>,
    /// Window start time-of-day
    #[serde(default)]
    pub start_time: Option<String>,
    /// Window end time-of-day
    #[serde(default)]
    pub end_time: Option<String>,
    /// Display-only details
    #[serde(default)]
    pub details: Option<String>,
    /// Display-only location
    #[serde(default)]
    pub location: Option<String>,
    /// Whether the entry repeats weekly
    #[serde(default)]
    pub recurring: bool,
    /// Free-text weekday specifier for the weekly rule
    #[serde(default)]
    pub recurring_day: Option<String>,
    /// Due time-of-day for the weekly rule
    #[serde(default)]
    pub recurring_time: Option<String>,
}

/// Reminder lead times in minutes, per event category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Minutes before a lecture starts
    pub lecture: u32,
    /// Minutes before an exam-classified entry starts
    pub exam: u32,
    /// Minutes before any other assignment starts
    pub assignment: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            lecture: 15,
            exam: 1440,
            assignment: 60,
        }
    }
}

/// Named timezones for wall-clock projection.
///
/// With no `user` zone the output is floating: events occur at the stated
/// local wall-clock time wherever they are viewed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimezoneConfig {
    /// Source ("school") timezone identifier
    #[serde(default)]
    pub school: Option<String>,
    /// Target ("user") timezone identifier
    #[serde(default)]
    pub user: Option<String>,
}

/// One synthesized calendar event.
///
/// Date-times are the final wall-clock values: projection has already
/// happened and serialization emits them floating, with no zone designator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event title (SUMMARY)
    pub title: String,
    /// Start wall-clock instant
    pub start: NaiveDateTime,
    /// End wall-clock instant
    pub end: NaiveDateTime,
    /// Location text, may be empty
    pub location: String,
    /// Description text
    pub description: String,
    /// Weekly recurrence boundary (RRULE UNTIL), when the event repeats
    pub repeat_until: Option<NaiveDateTime>,
    /// Reminder lead in minutes; 0 means no alarm
    pub reminder_minutes: u32,
}
