mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "coursecal")]
#[command(about = "Turn a course syllabus into an ICS calendar")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a syllabus document and generate an ICS file
    ///
    /// Requires GEMINI_API_KEY for the extraction service.
    Generate {
        /// Syllabus document (PDF, DOCX, image or text)
        #[arg(short, long)]
        input: String,

        /// Semester start date (YYYY-MM-DD)
        #[arg(short = 's', long)]
        start_date: String,

        /// Semester end date (YYYY-MM-DD)
        #[arg(short = 'e', long)]
        end_date: String,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Generate an ICS file from already-extracted course data JSON
    Compile {
        /// Course data JSON file
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },
}

/// Scheduling flags shared by both subcommands
#[derive(Args)]
struct ScheduleArgs {
    /// Lecture reminder lead (minutes, 0 disables)
    #[arg(long, default_value = "15")]
    lecture_reminder: u32,

    /// Exam reminder lead (minutes, 0 disables)
    #[arg(long, default_value = "1440")]
    exam_reminder: u32,

    /// Assignment reminder lead (minutes, 0 disables)
    #[arg(long, default_value = "60")]
    assignment_reminder: u32,

    /// School timezone identifier, e.g. America/Chicago
    #[arg(long)]
    school_timezone: Option<String>,

    /// Your timezone identifier; omit for floating local times
    #[arg(long)]
    user_timezone: Option<String>,

    /// Calendar name
    #[arg(long)]
    calendar_name: Option<String>,

    /// Output file path
    #[arg(short, long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    format!("coursecal_cli={},coursecal_core={}", log_level, log_level).into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Generate {
            input,
            start_date,
            end_date,
            schedule,
        } => commands::generate_command(input, start_date, end_date, schedule.into()).await,

        Commands::Compile { input, schedule } => {
            commands::compile_command(input, schedule.into()).await
        }
    }
}

impl From<ScheduleArgs> for commands::ScheduleParams {
    fn from(args: ScheduleArgs) -> Self {
        Self {
            lecture_reminder: args.lecture_reminder,
            exam_reminder: args.exam_reminder,
            assignment_reminder: args.assignment_reminder,
            school_timezone: args.school_timezone,
            user_timezone: args.user_timezone,
            calendar_name: args.calendar_name,
            output: args.output,
        }
    }
}
