use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

use crate::{
    Assignment, CalendarEvent, CourseData, Error, Lecture, ReminderConfig, Result, TimezoneConfig,
    days, times,
    times::LooseDateTime,
    tz::TzProjector,
};

/// Fixed type label to title abbreviation table.
const TYPE_CODES: [(&str, &str); 8] = [
    ("Lecture", "LEC"),
    ("Laboratory", "LAB"),
    ("Discussion", "DIS"),
    ("Quiz", "QZ"),
    ("Homework", "HW"),
    ("Exam", "EXAM"),
    ("Midterm", "MID"),
    ("Final", "FIN"),
];

/// Abbreviation for type labels outside the table.
const DEFAULT_TYPE_CODE: &str = "HW";

/// Keywords that put an assignment in the exam reminder category.
const EXAM_KEYWORDS: [&str; 4] = ["exam", "midterm", "final", "test"];

/// Duration of a timed exam window when no end time is given.
const EXAM_WINDOW_MINUTES: i64 = 120;

/// Visible lead before a bare deadline, exam-classified vs not.
const EXAM_DEADLINE_LEAD_MINUTES: i64 = 120;
const DEADLINE_LEAD_MINUTES: i64 = 30;

/// Visible lead before a weekly due instant.
const RECURRING_LEAD_MINUTES: i64 = 30;

/// Due time assumed for weekly rules without one.
const DEFAULT_DUE_TIME: &str = "23:59";

/// Title abbreviation for a type label. Lookup is exact; unknown labels
/// are treated as homework.
pub fn type_code(label: &str) -> &'static str {
    TYPE_CODES
        .iter()
        .find(|(name, _)| *name == label)
        .map_or(DEFAULT_TYPE_CODE, |&(_, code)| code)
}

/// Whether a type label falls in the exam reminder category.
pub fn is_exam_like(label: &str) -> bool {
    let label = label.to_lowercase();
    EXAM_KEYWORDS.iter().any(|keyword| label.contains(keyword))
}

/// First calendar occurrence of `weekday` on or after `start`, inclusive.
/// The forward search never moves more than six days.
pub fn first_occurrence(start: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead =
        (weekday.num_days_from_monday() + 7 - start.weekday().num_days_from_monday()) % 7;
    start + Duration::days(i64::from(ahead))
}

/// A compiled event collection plus notes about entries that produced no
/// events. The notes are informational; partial output is intentional.
#[derive(Debug, Clone, Default)]
pub struct CompiledSchedule {
    /// Synthesized events, one per lecture-weekday or placed assignment
    pub events: Vec<CalendarEvent>,
    /// Human-readable notes for silently dropped entries
    pub dropped: Vec<String>,
}

/// Turns structured course data into calendar events.
///
/// Pure and synchronous: each call builds an isolated event collection,
/// so compilers are freely shared across concurrent requests.
#[derive(Debug, Clone)]
pub struct ScheduleCompiler {
    reminders: ReminderConfig,
    projector: TzProjector,
}

impl ScheduleCompiler {
    pub fn new(reminders: ReminderConfig, timezones: &TimezoneConfig) -> Self {
        Self {
            reminders,
            projector: TzProjector::from_config(timezones),
        }
    }

    /// Compiles the full schedule: every lecture meeting pattern and every
    /// placeable assignment.
    ///
    /// Only unusable semester dates fail the call; individual entries that
    /// cannot be placed are dropped with a note instead.
    pub fn compile(&self, data: &CourseData) -> Result<CompiledSchedule> {
        let semester_start = times::parse_date(&data.semester_start).ok_or_else(|| {
            Error::Config(format!("invalid semester start date '{}'", data.semester_start))
        })?;
        let semester_end = times::parse_date(&data.semester_end).ok_or_else(|| {
            Error::Config(format!("invalid semester end date '{}'", data.semester_end))
        })?;

        // Recurrence boundary: 23:59:59 on the semester end date, projected
        // once and shared by every weekly rule.
        let until = self
            .projector
            .project(semester_end.and_hms_opt(23, 59, 59).unwrap());

        let mut compiled = CompiledSchedule::default();
        for lecture in &data.lectures {
            self.compile_lecture(data, lecture, semester_start, until, &mut compiled);
        }
        for assignment in &data.assignments {
            self.compile_assignment(data, assignment, semester_start, until, &mut compiled);
        }
        Ok(compiled)
    }

    fn compile_lecture(
        &self,
        data: &CourseData,
        lecture: &Lecture,
        semester_start: NaiveDate,
        until: NaiveDateTime,
        compiled: &mut CompiledSchedule,
    ) {
        let weekdays = days::parse_days(&lecture.day);
        if weekdays.is_empty() {
            drop_entry(
                compiled,
                format!("lecture day '{}' matched no weekday", lecture.day),
            );
            return;
        }

        let start_time = times::parse_time(&lecture.start_time);
        let end_time = times::parse_time(&lecture.end_time);

        let mut title = format!("{} {}", data.course_code, type_code("Lecture"));
        if let Some(section) = lecture.section.as_deref().filter(|s| !s.is_empty()) {
            title.push(' ');
            title.push_str(section);
        }
        let location = lecture_location(lecture, &data.school_name);
        let description = format!(
            "Type: Lecture\nRoom: {}\nSection: {}",
            lecture.room.as_deref().unwrap_or("N/A"),
            lecture.section.as_deref().unwrap_or("N/A"),
        );

        for weekday in weekdays {
            let first = first_occurrence(semester_start, weekday);
            compiled.events.push(self.build_event(
                title.clone(),
                first.and_time(start_time),
                first.and_time(end_time),
                location.clone(),
                description.clone(),
                Some(until),
                self.reminders.lecture,
            ));
        }
    }

    fn compile_assignment(
        &self,
        data: &CourseData,
        assignment: &Assignment,
        semester_start: NaiveDate,
        until: NaiveDateTime,
        compiled: &mut CompiledSchedule,
    ) {
        let title = format!(
            "{} {}: {}",
            data.course_code,
            type_code(&assignment.kind),
            assignment.title
        );
        let location =
            assignment_location(assignment.location.as_deref(), &data.school_name);
        let description = format!(
            "Type: {}\nDetails: {}",
            assignment.kind,
            assignment.details.as_deref().unwrap_or_default(),
        );
        let exam_like = is_exam_like(&assignment.kind);
        let reminder = if exam_like {
            self.reminders.exam
        } else {
            self.reminders.assignment
        };

        // The three placement shapes are priority-ordered; a record that
        // satisfies several only ever uses the first.
        if let (Some(exam_date), Some(start_time)) = (
            assignment.exam_date.as_deref(),
            assignment.start_time.as_deref(),
        ) {
            let Some(date) = times::parse_date(exam_date) else {
                drop_entry(
                    compiled,
                    format!("'{}': unparseable exam date '{}'", assignment.title, exam_date),
                );
                return;
            };
            let start = date.and_time(times::parse_time(start_time));
            let end = match assignment.end_time.as_deref() {
                Some(end_time) => date.and_time(times::parse_time(end_time)),
                None => start + Duration::minutes(EXAM_WINDOW_MINUTES),
            };
            compiled.events.push(self.build_event(
                title,
                start,
                end,
                location,
                description,
                None,
                reminder,
            ));
        } else if assignment.recurring && assignment.recurring_day.is_some() {
            let day_field = assignment.recurring_day.as_deref().unwrap_or_default();
            let weekdays = days::parse_days(day_field);
            if weekdays.is_empty() {
                drop_entry(
                    compiled,
                    format!("'{}': recurring day '{}' matched no weekday", assignment.title, day_field),
                );
                return;
            }
            let due_time = times::parse_time(
                assignment.recurring_time.as_deref().unwrap_or(DEFAULT_DUE_TIME),
            );
            for weekday in weekdays {
                let due = first_occurrence(semester_start, weekday).and_time(due_time);
                compiled.events.push(self.build_event(
                    title.clone(),
                    due - Duration::minutes(RECURRING_LEAD_MINUTES),
                    due,
                    location.clone(),
                    description.clone(),
                    Some(until),
                    reminder,
                ));
            }
        } else if let Some(due_date) = assignment.due_date.as_deref() {
            let Some(stamp) = times::parse_date_time(due_date) else {
                drop_entry(
                    compiled,
                    format!("'{}': unparseable due date '{}'", assignment.title, due_date),
                );
                return;
            };
            // A deadline without an explicit zone is read as school wall
            // clock; a zoned one is re-expressed in the school zone first.
            let due = match stamp {
                LooseDateTime::Zoned(instant) => self.projector.to_school_wall(instant),
                LooseDateTime::Floating(wall) => wall,
            };
            let lead = if exam_like {
                EXAM_DEADLINE_LEAD_MINUTES
            } else {
                DEADLINE_LEAD_MINUTES
            };
            compiled.events.push(self.build_event(
                title,
                due - Duration::minutes(lead),
                due,
                location,
                description,
                None,
                reminder,
            ));
        } else {
            drop_entry(
                compiled,
                format!("'{}': no usable date fields", assignment.title),
            );
        }
    }

    /// Builds one calendar event: fixes overnight spans, projects wall
    /// clocks, and attaches recurrence and reminder data.
    fn build_event(
        &self,
        title: String,
        start: NaiveDateTime,
        mut end: NaiveDateTime,
        location: String,
        description: String,
        repeat_until: Option<NaiveDateTime>,
        reminder_minutes: u32,
    ) -> CalendarEvent {
        // Overnight span on a same-day wall clock pair; must run before
        // projection, which can itself shift calendar days.
        if end < start {
            end += Duration::days(1);
        }
        CalendarEvent {
            title,
            start: self.projector.project(start),
            end: self.projector.project(end),
            location,
            description,
            repeat_until,
            reminder_minutes,
        }
    }
}

fn lecture_location(lecture: &Lecture, school_name: &str) -> String {
    if let Some(address) = lecture.full_address.as_deref().filter(|a| !a.is_empty()) {
        return address.to_string();
    }
    match lecture.building.as_deref().filter(|b| !b.is_empty()) {
        Some(building) => format!("{}, {}", building, school_name),
        None => school_name.to_string(),
    }
}

/// Appends the school name unless the location already carries it or
/// names an online venue. An absent location stays empty.
fn assignment_location(location: Option<&str>, school_name: &str) -> String {
    match location {
        None => String::new(),
        Some(location) if location.is_empty() => String::new(),
        Some(location) => {
            if location.to_lowercase().contains("online") || location.contains(school_name) {
                location.to_string()
            } else {
                format!("{}, {}", location, school_name)
            }
        }
    }
}

fn drop_entry(compiled: &mut CompiledSchedule, note: String) {
    tracing::warn!(note = %note, "entry produced no events");
    compiled.dropped.push(note);
}

#[cfg(test)]
mod tests;
