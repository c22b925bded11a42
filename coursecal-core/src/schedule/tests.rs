use std::io::BufReader;

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use ical::parser::ical::IcalParser;

use super::*;
use crate::ics::IcsGenerator;
use crate::{Assignment, CourseData, Lecture, ReminderConfig, TimezoneConfig};

fn course(lectures: Vec<Lecture>, assignments: Vec<Assignment>) -> CourseData {
    CourseData {
        school_name: "Northeastern University".to_string(),
        course_code: "CS 2500".to_string(),
        course_name: "Fundamentals of Computer Science".to_string(),
        semester_start: "2025-01-06".to_string(), // a Monday
        semester_end: "2025-04-25".to_string(),
        lectures,
        assignments,
    }
}

fn lecture(day: &str, start: &str, end: &str) -> Lecture {
    Lecture {
        day: day.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        building: Some("Snell Library".to_string()),
        room: Some("101".to_string()),
        section: None,
        full_address: None,
    }
}

fn assignment(title: &str, kind: &str) -> Assignment {
    Assignment {
        title: title.to_string(),
        kind: kind.to_string(),
        due_date: None,
        exam_date: None,
        start_time: None,
        end_time: None,
        details: None,
        location: None,
        recurring: false,
        recurring_day: None,
        recurring_time: None,
    }
}

fn reminders() -> ReminderConfig {
    ReminderConfig {
        lecture: 10,
        exam: 1440,
        assignment: 60,
    }
}

fn floating_compiler() -> ScheduleCompiler {
    ScheduleCompiler::new(reminders(), &TimezoneConfig::default())
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[test]
fn test_first_occurrence_is_inclusive_and_bounded() {
    let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    assert_eq!(first_occurrence(monday, Weekday::Mon), monday);
    assert_eq!(
        first_occurrence(monday, Weekday::Wed),
        NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()
    );
    // Sunday is the furthest reach: six days, never seven
    assert_eq!(
        first_occurrence(monday, Weekday::Sun),
        NaiveDate::from_ymd_opt(2025, 1, 12).unwrap()
    );
}

#[test]
fn test_type_codes() {
    assert_eq!(type_code("Quiz"), "QZ");
    assert_eq!(type_code("Final"), "FIN");
    assert_eq!(type_code("Laboratory"), "LAB");
    // Lookup is exact; anything else is homework
    assert_eq!(type_code("Essay"), "HW");
    assert_eq!(type_code("quiz"), "HW");
}

#[test]
fn test_exam_classification() {
    assert!(is_exam_like("Midterm Exam"));
    assert!(is_exam_like("Final"));
    assert!(is_exam_like("Pop Quiz — Test"));
    assert!(!is_exam_like("Homework 3"));
    assert!(!is_exam_like("Discussion"));
}

#[test]
fn test_weekly_lecture_pair() {
    let data = course(vec![lecture("MonWed", "10:00", "10:50")], vec![]);
    let compiled = floating_compiler().compile(&data).unwrap();

    assert_eq!(compiled.events.len(), 2);
    assert!(compiled.dropped.is_empty());

    let monday = &compiled.events[0];
    assert_eq!(monday.title, "CS 2500 LEC");
    assert_eq!(monday.start, at(2025, 1, 6, 10, 0));
    assert_eq!(monday.end, at(2025, 1, 6, 10, 50));
    assert_eq!(monday.location, "Snell Library, Northeastern University");
    assert_eq!(monday.reminder_minutes, 10);

    let wednesday = &compiled.events[1];
    assert_eq!(wednesday.start, at(2025, 1, 8, 10, 0));

    // UNTIL falls on the semester end date at 23:59:59 for both rules
    let until = NaiveDate::from_ymd_opt(2025, 4, 25)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap();
    assert_eq!(monday.repeat_until, Some(until));
    assert_eq!(wednesday.repeat_until, Some(until));
}

#[test]
fn test_lecture_section_and_address() {
    let mut section_lecture = lecture("Fri", "9:00", "9:50");
    section_lecture.section = Some("02".to_string());
    section_lecture.full_address = Some("360 Huntington Ave, Boston".to_string());
    let data = course(vec![section_lecture], vec![]);
    let compiled = floating_compiler().compile(&data).unwrap();

    let event = &compiled.events[0];
    assert_eq!(event.title, "CS 2500 LEC 02");
    // The full address beats building + school
    assert_eq!(event.location, "360 Huntington Ave, Boston");
    assert!(event.description.contains("Section: 02"));
}

#[test]
fn test_lecture_with_unmatched_day_is_dropped_with_note() {
    let data = course(vec![lecture("TBA", "10:00", "10:50")], vec![]);
    let compiled = floating_compiler().compile(&data).unwrap();
    assert!(compiled.events.is_empty());
    assert_eq!(compiled.dropped.len(), 1);
    assert!(compiled.dropped[0].contains("TBA"));
}

#[test]
fn test_overnight_lecture_ends_next_day() {
    let data = course(vec![lecture("Mon", "22:00", "01:00")], vec![]);
    let compiled = floating_compiler().compile(&data).unwrap();
    let event = &compiled.events[0];
    assert_eq!(event.start, at(2025, 1, 6, 22, 0));
    assert_eq!(event.end, at(2025, 1, 7, 1, 0));
}

#[test]
fn test_timed_exam_window() {
    let mut final_exam = assignment("Final Exam", "Final");
    final_exam.exam_date = Some("2025-05-10".to_string());
    final_exam.start_time = Some("7:00 PM".to_string());
    final_exam.end_time = Some("9:00 PM".to_string());
    let data = course(vec![], vec![final_exam]);
    let compiled = floating_compiler().compile(&data).unwrap();

    assert_eq!(compiled.events.len(), 1);
    let event = &compiled.events[0];
    assert_eq!(event.title, "CS 2500 FIN: Final Exam");
    assert_eq!(event.start, at(2025, 5, 10, 19, 0));
    assert_eq!(event.end, at(2025, 5, 10, 21, 0));
    assert_eq!(event.repeat_until, None);
    assert_eq!(event.reminder_minutes, 1440);
}

#[test]
fn test_exam_window_without_end_defaults_to_two_hours() {
    let mut midterm = assignment("Midterm 1", "Midterm");
    midterm.exam_date = Some("2025-03-03".to_string());
    midterm.start_time = Some("18:00".to_string());
    let data = course(vec![], vec![midterm]);
    let compiled = floating_compiler().compile(&data).unwrap();
    let event = &compiled.events[0];
    assert_eq!(event.start, at(2025, 3, 3, 18, 0));
    assert_eq!(event.end, at(2025, 3, 3, 20, 0));
}

#[test]
fn test_weekly_quiz_rule() {
    let mut quiz = assignment("Weekly Quiz", "Quiz");
    quiz.recurring = true;
    quiz.recurring_day = Some("Tuesday".to_string());
    quiz.recurring_time = Some("11:59 PM".to_string());
    let data = course(vec![], vec![quiz]);
    let compiled = floating_compiler().compile(&data).unwrap();

    assert_eq!(compiled.events.len(), 1);
    let event = &compiled.events[0];
    assert_eq!(event.title, "CS 2500 QZ: Weekly Quiz");
    // Due Tuesday 23:59, visible start 30 minutes earlier
    assert_eq!(event.end, at(2025, 1, 7, 23, 59));
    assert_eq!(event.start, at(2025, 1, 7, 23, 29));
    assert!(event.repeat_until.is_some());
    assert_eq!(event.reminder_minutes, 60);
}

#[test]
fn test_weekly_rule_without_time_defaults_to_end_of_day() {
    let mut reading = assignment("Reading Response", "Homework");
    reading.recurring = true;
    reading.recurring_day = Some("Fri".to_string());
    let data = course(vec![], vec![reading]);
    let compiled = floating_compiler().compile(&data).unwrap();
    assert_eq!(compiled.events[0].end, at(2025, 1, 10, 23, 59));
}

#[test]
fn test_exam_window_beats_weekly_rule() {
    let mut conflicted = assignment("Midterm", "Midterm");
    conflicted.exam_date = Some("2025-03-03".to_string());
    conflicted.start_time = Some("18:00".to_string());
    conflicted.end_time = Some("20:00".to_string());
    conflicted.recurring = true;
    conflicted.recurring_day = Some("Mon".to_string());
    let data = course(vec![], vec![conflicted]);
    let compiled = floating_compiler().compile(&data).unwrap();

    // One event via the timed-window strategy, not two
    assert_eq!(compiled.events.len(), 1);
    assert_eq!(compiled.events[0].repeat_until, None);
    assert_eq!(compiled.events[0].start, at(2025, 3, 3, 18, 0));
}

#[test]
fn test_single_deadline_leads() {
    let mut homework = assignment("Problem Set 2", "Homework");
    homework.due_date = Some("2025-02-14T23:59".to_string());
    let mut takehome = assignment("Take-home Final", "Final");
    takehome.due_date = Some("2025-04-20T17:00".to_string());
    let data = course(vec![], vec![homework, takehome]);
    let compiled = floating_compiler().compile(&data).unwrap();

    let homework = &compiled.events[0];
    assert_eq!(homework.end, at(2025, 2, 14, 23, 59));
    assert_eq!(homework.start, at(2025, 2, 14, 23, 29));
    assert_eq!(homework.reminder_minutes, 60);

    // Exam-classified deadlines get the longer visible lead
    let takehome = &compiled.events[1];
    assert_eq!(takehome.end, at(2025, 4, 20, 17, 0));
    assert_eq!(takehome.start, at(2025, 4, 20, 15, 0));
    assert_eq!(takehome.reminder_minutes, 1440);
}

#[test]
fn test_date_only_deadline_anchors_at_midnight() {
    let mut essay = assignment("Essay Draft", "Homework");
    essay.due_date = Some("2025-02-14".to_string());
    let data = course(vec![], vec![essay]);
    let compiled = floating_compiler().compile(&data).unwrap();
    assert_eq!(compiled.events[0].end, at(2025, 2, 14, 0, 0));
}

#[test]
fn test_shapeless_assignment_drops_with_note() {
    let data = course(vec![], vec![assignment("Mystery Item", "Homework")]);
    let compiled = floating_compiler().compile(&data).unwrap();
    assert!(compiled.events.is_empty());
    assert_eq!(compiled.dropped.len(), 1);
    assert!(compiled.dropped[0].contains("Mystery Item"));
}

#[test]
fn test_assignment_location_rules() {
    let mut online_quiz = assignment("Quiz 1", "Quiz");
    online_quiz.exam_date = Some("2025-02-03".to_string());
    online_quiz.start_time = Some("10:00".to_string());
    online_quiz.location = Some("Online (Canvas)".to_string());
    let mut hall_exam = assignment("Midterm", "Midterm");
    hall_exam.exam_date = Some("2025-03-03".to_string());
    hall_exam.start_time = Some("18:00".to_string());
    hall_exam.location = Some("Richards Hall 300".to_string());
    let data = course(vec![], vec![online_quiz, hall_exam]);
    let compiled = floating_compiler().compile(&data).unwrap();

    // Online venues keep their location untouched
    assert_eq!(compiled.events[0].location, "Online (Canvas)");
    // Physical venues get the school name appended
    assert_eq!(
        compiled.events[1].location,
        "Richards Hall 300, Northeastern University"
    );
}

#[test]
fn test_dual_timezone_projection_shifts_events_and_until() {
    let timezones = TimezoneConfig {
        school: Some("America/Chicago".to_string()),
        user: Some("America/New_York".to_string()),
    };
    let compiler = ScheduleCompiler::new(reminders(), &timezones);
    let data = course(vec![lecture("Mon", "10:00", "10:50")], vec![]);
    let compiled = compiler.compile(&data).unwrap();

    let event = &compiled.events[0];
    assert_eq!(event.start, at(2025, 1, 6, 11, 0));
    assert_eq!(event.end, at(2025, 1, 6, 11, 50));
    // The until boundary undergoes the same projection, crossing midnight
    let until = NaiveDate::from_ymd_opt(2025, 4, 26)
        .unwrap()
        .and_hms_opt(0, 59, 59)
        .unwrap();
    assert_eq!(event.repeat_until, Some(until));
}

#[test]
fn test_inverted_semester_is_tolerated() {
    let mut data = course(vec![lecture("Mon", "10:00", "10:50")], vec![]);
    data.semester_end = "2024-12-01".to_string();
    let compiled = floating_compiler().compile(&data).unwrap();
    // UNTIL precedes the first occurrence: a series with no occurrences,
    // not a crash
    let event = &compiled.events[0];
    assert!(event.repeat_until.unwrap() < event.start);
}

#[test]
fn test_invalid_semester_date_is_a_config_error() {
    let mut data = course(vec![], vec![]);
    data.semester_start = "next fall".to_string();
    let error = floating_compiler().compile(&data).unwrap_err();
    assert!(matches!(error, crate::Error::Config(_)));
}

#[test]
fn test_generated_calendar_round_trips() {
    let mut quiz = assignment("Weekly Quiz", "Quiz");
    quiz.recurring = true;
    quiz.recurring_day = Some("TuTh".to_string());
    quiz.recurring_time = Some("11:59 PM".to_string());
    let mut final_exam = assignment("Final Exam", "Final");
    final_exam.exam_date = Some("2025-05-10".to_string());
    final_exam.start_time = Some("7:00 PM".to_string());
    final_exam.end_time = Some("9:00 PM".to_string());
    let data = course(
        vec![lecture("MonWed", "10:00", "10:50")],
        vec![quiz, final_exam],
    );
    let compiled = floating_compiler().compile(&data).unwrap();

    // 2 lecture weekdays + 2 quiz weekdays + 1 exam window
    assert_eq!(compiled.events.len(), 5);

    let ics = IcsGenerator::new(Some("CS 2500 Schedule".to_string()))
        .generate(&compiled.events)
        .unwrap();
    let mut parsed_events = 0;
    for calendar in IcalParser::new(BufReader::new(ics.as_bytes())) {
        let calendar = calendar.expect("generated calendar parses");
        parsed_events += calendar.events.len();
        for event in &calendar.events {
            assert!(
                event
                    .properties
                    .iter()
                    .any(|property| property.name == "DTSTART")
            );
        }
    }
    assert_eq!(parsed_events, compiled.events.len());

    // Recurring events carry a weekly rule with a floating UNTIL
    assert!(ics.contains("RRULE:FREQ=WEEKLY;UNTIL=20250425T235959\r\n"));
    // Day-multiple exam reminder vs minute lecture reminder
    assert!(ics.contains("TRIGGER:-P1D\r\n"));
    assert!(ics.contains("TRIGGER:-PT10M\r\n"));
}
