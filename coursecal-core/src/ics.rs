use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::{CalendarEvent, Result};

/// Floating date-time layout: local wall clock, no zone designator.
const DT_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Minutes in a day; reminder offsets at an exact multiple serialize as
/// whole-day triggers.
const MINUTES_PER_DAY: u32 = 1440;

/// ICS calendar serializer
pub struct IcsGenerator {
    calendar_name: Option<String>,
}

impl IcsGenerator {
    pub fn new(calendar_name: Option<String>) -> Self {
        Self { calendar_name }
    }

    /// Serializes the event collection into one iCalendar text stream.
    pub fn generate(&self, events: &[CalendarEvent]) -> Result<String> {
        let mut ics_content = String::new();

        // ICS file header
        ics_content.push_str("BEGIN:VCALENDAR\r\n");
        ics_content.push_str("VERSION:2.0\r\n");
        ics_content.push_str("PRODID:-//Coursecal//Syllabus Schedule//EN\r\n");
        ics_content.push_str("CALSCALE:GREGORIAN\r\n");
        ics_content.push_str("METHOD:PUBLISH\r\n");

        if let Some(ref name) = self.calendar_name {
            ics_content.push_str(&format!("X-WR-CALNAME:{}\r\n", self.escape_text(name)));
        }

        for event in events {
            self.write_event(&mut ics_content, event);
        }

        ics_content.push_str("END:VCALENDAR\r\n");

        Ok(ics_content)
    }

    /// Writes a single VEVENT block
    fn write_event(&self, ics_content: &mut String, event: &CalendarEvent) {
        let uid = Uuid::new_v4().to_string();
        let dtstamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        ics_content.push_str("BEGIN:VEVENT\r\n");
        ics_content.push_str(&format!("UID:{}\r\n", uid));
        ics_content.push_str(&format!("DTSTAMP:{}\r\n", dtstamp));
        ics_content.push_str(&format!("DTSTART:{}\r\n", format_dt(event.start)));
        ics_content.push_str(&format!("DTEND:{}\r\n", format_dt(event.end)));
        ics_content.push_str(&format!("SUMMARY:{}\r\n", self.escape_text(&event.title)));

        if !event.location.is_empty() {
            ics_content.push_str(&format!(
                "LOCATION:{}\r\n",
                self.escape_text(&event.location)
            ));
        }

        if !event.description.is_empty() {
            ics_content.push_str(&format!(
                "DESCRIPTION:{}\r\n",
                self.escape_text(&event.description)
            ));
        }

        // Weekly recurrence with an explicit UNTIL boundary; never a COUNT
        if let Some(until) = event.repeat_until {
            ics_content.push_str(&format!(
                "RRULE:FREQ=WEEKLY;UNTIL={}\r\n",
                format_dt(until)
            ));
        }

        if event.reminder_minutes > 0 {
            self.write_alarm(ics_content, event);
        }

        ics_content.push_str("END:VEVENT\r\n");
    }

    /// Writes the VALARM sub-block: a relative display trigger before the
    /// event start, in whole days when the offset allows it.
    fn write_alarm(&self, ics_content: &mut String, event: &CalendarEvent) {
        let trigger = if event.reminder_minutes % MINUTES_PER_DAY == 0 {
            format!("-P{}D", event.reminder_minutes / MINUTES_PER_DAY)
        } else {
            format!("-PT{}M", event.reminder_minutes)
        };

        ics_content.push_str("BEGIN:VALARM\r\n");
        ics_content.push_str("ACTION:DISPLAY\r\n");
        ics_content.push_str(&format!("TRIGGER:{}\r\n", trigger));
        ics_content.push_str(&format!(
            "DESCRIPTION:Reminder: {}\r\n",
            self.escape_text(&event.title)
        ));
        ics_content.push_str("END:VALARM\r\n");
    }

    /// Escapes ICS text content
    fn escape_text(&self, text: &str) -> String {
        text.replace("\\", "\\\\")
            .replace("\n", "\\n")
            .replace("\r", "\\r")
            .replace(",", "\\,")
            .replace(";", "\\;")
    }
}

impl Default for IcsGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}

fn format_dt(at: NaiveDateTime) -> String {
    at.format(DT_FORMAT).to_string()
}
