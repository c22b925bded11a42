use std::fs;

use anyhow::{Context, Result};
use coursecal_core::{
    CourseData, ReminderConfig, TimezoneConfig,
    extract::{Extractor, GeminiExtractor, SemesterWindow, SyllabusDocument},
    ics::IcsGenerator,
    schedule::{CompiledSchedule, ScheduleCompiler},
};

/// Scheduling parameters shared by both subcommands
pub struct ScheduleParams {
    pub lecture_reminder: u32,
    pub exam_reminder: u32,
    pub assignment_reminder: u32,
    pub school_timezone: Option<String>,
    pub user_timezone: Option<String>,
    pub calendar_name: Option<String>,
    pub output: Option<String>,
}

/// Full pipeline: extract the syllabus, then compile and write the ICS file
pub async fn generate_command(
    input: String,
    start_date: String,
    end_date: String,
    params: ScheduleParams,
) -> Result<()> {
    let extractor = GeminiExtractor::from_env()?;

    let bytes = fs::read(&input).with_context(|| format!("failed to read {}", input))?;
    let file_name = std::path::Path::new(&input)
        .file_name()
        .map_or_else(|| input.clone(), |n| n.to_string_lossy().into_owned());
    let document = SyllabusDocument::new(file_name, bytes);
    let window = SemesterWindow {
        start_date,
        end_date,
    };

    println!("Extracting course data from {}...", input);
    let data = extractor.extract(&document, &window).await?;
    println!(
        "✓ Extracted {} ({}): {} lectures, {} assignments",
        data.course_code,
        data.course_name,
        data.lectures.len(),
        data.assignments.len()
    );

    write_calendar(&data, params)
}

/// Offline pipeline: read extracted course data JSON and write the ICS file
pub async fn compile_command(input: String, params: ScheduleParams) -> Result<()> {
    let json = fs::read_to_string(&input).with_context(|| format!("failed to read {}", input))?;
    let data: CourseData =
        serde_json::from_str(&json).with_context(|| format!("invalid course data in {}", input))?;
    println!(
        "✓ Loaded {}: {} lectures, {} assignments",
        data.course_code,
        data.lectures.len(),
        data.assignments.len()
    );

    write_calendar(&data, params)
}

fn write_calendar(data: &CourseData, params: ScheduleParams) -> Result<()> {
    let reminders = ReminderConfig {
        lecture: params.lecture_reminder,
        exam: params.exam_reminder,
        assignment: params.assignment_reminder,
    };
    let timezones = TimezoneConfig {
        school: params.school_timezone,
        user: params.user_timezone,
    };

    let compiler = ScheduleCompiler::new(reminders, &timezones);
    let compiled = compiler.compile(data)?;
    report_dropped(&compiled);

    let calendar_name = params
        .calendar_name
        .or_else(|| Some(format!("{} Schedule", data.course_code)));
    let generator = IcsGenerator::new(calendar_name);
    let ics_content = generator.generate(&compiled.events)?;

    let output_file = params.output.unwrap_or_else(|| {
        format!(
            "{}-schedule.ics",
            data.course_code.to_lowercase().replace(' ', "-")
        )
    });

    fs::write(&output_file, ics_content)?;
    println!(
        "✓ Wrote {} events to {}",
        compiled.events.len(),
        output_file
    );

    Ok(())
}

fn report_dropped(compiled: &CompiledSchedule) {
    if compiled.dropped.is_empty() {
        return;
    }
    println!(
        "⚠ {} entries produced no events:",
        compiled.dropped.len()
    );
    for note in &compiled.dropped {
        println!("  - {}", note);
    }
}
