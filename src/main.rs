// ==========================================
// 学生档案管理 - 命令行入口
// ==========================================
// 职责: 解析命令行参数，装配 AppState，调用 API
// 错误: API 错误输出面向用户的提示，退出码 1
// ==========================================

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use student_tracker::api::ApiError;
use student_tracker::app::AppState;
use student_tracker::config::AppConfig;
use student_tracker::domain::{NewClassSession, NewStudent};
use student_tracker::{logging, AttendanceStatus, APP_NAME, VERSION};

#[derive(Debug, Parser)]
#[command(name = "student-tracker")]
#[command(about = "Student Tracker - student records, attendance, marks and backups", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the database schema if missing
    Init,
    /// Add a student
    Add(StudentArgs),
    /// Update a student
    Update {
        id: i64,
        #[command(flatten)]
        student: StudentArgs,
    },
    /// List students (paginated, filtered)
    List {
        #[arg(long)]
        group: Option<String>,
        /// Case-sensitive search on matricule or names (% and _ wildcards)
        #[arg(long)]
        search: Option<String>,
        /// Page number, starting at 0
        #[arg(long, default_value_t = 0)]
        page: i64,
    },
    /// Show a student with statistics
    Show { id: i64 },
    /// Delete a student and all related records
    Delete { id: i64 },
    /// List distinct groups
    Groups,
    /// Create a class session
    AddClass {
        course: String,
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        group: Option<String>,
    },
    /// List class sessions
    Classes {
        #[arg(long)]
        group: Option<String>,
    },
    /// Record attendance (PRESENT, ABSENT, JUSTIFIED_ABSENT)
    Attend {
        student_id: i64,
        class_id: i64,
        status: AttendanceStatus,
    },
    /// Set a mark; an empty score clears it
    Mark {
        student_id: i64,
        class_id: i64,
        score: String,
    },
    /// Add a comment
    Comment {
        student_id: i64,
        class_id: i64,
        text: String,
    },
    /// Import students from an .xlsx/.xls/.csv file
    Import {
        file: PathBuf,
        /// Group applied to every imported row
        #[arg(long)]
        group: Option<String>,
    },
    /// Export students to an .xlsx file
    Export {
        #[arg(long)]
        group: Option<String>,
        /// Output path (defaults to the exports directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Copy the database into the backup directory
    Backup,
    /// List existing backups
    Backups,
    /// Run in the foreground with automatic backups until Ctrl-C
    Run,
}

#[derive(Debug, Args)]
struct StudentArgs {
    matricule: String,
    last_name: String,
    first_name: String,
    #[arg(long)]
    section: Option<String>,
    #[arg(long)]
    group: Option<String>,
}

impl From<StudentArgs> for NewStudent {
    fn from(args: StudentArgs) -> Self {
        NewStudent {
            matricule: args.matricule,
            last_name: args.last_name,
            first_name: args.first_name,
            section: args.section,
            group: args.group,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_with_format(cli.log_json);

    let json = cli.json;
    if let Err(e) = run(cli).await {
        match e.downcast_ref::<ApiError>() {
            Some(api_err) if json => {
                let response = api_err.to_response();
                match serde_json::to_string_pretty(&response) {
                    Ok(text) => eprintln!("{}", text),
                    Err(_) => eprintln!("Error: {}", response.message),
                }
            }
            Some(api_err) => eprintln!("Error: {}", api_err.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("加载配置失败")?;
    tracing::info!("{} v{}", APP_NAME, VERSION);

    let state = AppState::new(config).map_err(anyhow::Error::msg)?;
    let students = state.student_api.clone();
    let transfer = state.transfer_api.clone();
    let json = cli.json;

    match cli.command {
        Commands::Init => {
            println!("Database ready: {}", state.db_path.display());
        }
        Commands::Add(args) => {
            let id = students.add_student(&args.into())?;
            emit(json, &id, || println!("Student added with id {}", id))?;
        }
        Commands::Update { id, student } => {
            students.update_student(id, &student.into())?;
            println!("Student {} updated", id);
        }
        Commands::List {
            group,
            search,
            page,
        } => {
            let result = students.list_page(group.as_deref(), search.as_deref(), page)?;
            emit(json, &result, || {
                for s in &result.items {
                    println!(
                        "{:>6}  {}  {:<30}  {}",
                        s.id,
                        s.matricule,
                        s.full_name(),
                        s.group.as_deref().unwrap_or("-")
                    );
                }
                println!(
                    "-- {} of {} students (page {})",
                    result.items.len(),
                    result.total_count,
                    page
                );
            })?;
        }
        Commands::Show { id } => {
            let student = students.get_student(id)?;
            let stats = students.student_statistics(id)?;
            let detail = serde_json::json!({ "student": student, "statistics": stats });
            emit(json, &detail, || {
                println!("{} ({})", student.full_name(), student.matricule);
                println!("  Section: {}", student.section.as_deref().unwrap_or("-"));
                println!("  Group:   {}", student.group.as_deref().unwrap_or("-"));
                println!(
                    "  Attendance: {}/{} present, {} absent, {} justified ({:.2}%)",
                    stats.present_count,
                    stats.total_classes,
                    stats.absent_count,
                    stats.justified_count,
                    stats.attendance_rate
                );
                println!(
                    "  Marks: {} recorded, average {:.2}, highest {:.2}, lowest {:.2}",
                    stats.total_marks, stats.average_score, stats.highest_score, stats.lowest_score
                );
            })?;
        }
        Commands::Delete { id } => {
            students.delete_student(id)?;
            println!("Student {} deleted", id);
        }
        Commands::Groups => {
            let groups = students.list_groups()?;
            emit(json, &groups, || {
                for g in &groups {
                    println!("{}", g);
                }
            })?;
        }
        Commands::AddClass {
            course,
            date,
            subject,
            group,
        } => {
            let session = NewClassSession {
                course_name: course,
                subject_name: subject,
                date,
                group,
            };
            let id = students.create_class(&session)?;
            emit(json, &id, || println!("Class created with id {}", id))?;
        }
        Commands::Classes { group } => {
            let classes = students.list_classes(group.as_deref())?;
            emit(json, &classes, || {
                for c in &classes {
                    println!(
                        "{:>6}  {}  {:<24}  {}",
                        c.id,
                        c.date,
                        c.course_name,
                        c.group.as_deref().unwrap_or("-")
                    );
                }
            })?;
        }
        Commands::Attend {
            student_id,
            class_id,
            status,
        } => {
            students.record_attendance(student_id, class_id, status)?;
            println!("Attendance recorded: {}", status);
        }
        Commands::Mark {
            student_id,
            class_id,
            score,
        } => {
            students.set_mark_text(student_id, class_id, &score)?;
            println!("Mark saved");
        }
        Commands::Comment {
            student_id,
            class_id,
            text,
        } => {
            let id = students.add_comment(student_id, class_id, &text)?;
            emit(json, &id, || println!("Comment added with id {}", id))?;
        }
        Commands::Import { file, group } => {
            let mut handle = transfer.import_in_background(file, group)?;
            while let Some(progress) = handle.next_progress().await {
                if !json {
                    eprint!("\rImporting... {:>3.0}%", progress.fraction * 100.0);
                }
            }
            if !json {
                eprintln!();
            }
            let summary = handle.wait().await.map_err(ApiError::from)?;
            emit(json, &summary, || {
                println!("{}", summary.message);
                for row in &summary.row_errors {
                    println!(
                        "  row {} ({}): {}",
                        row.row_number,
                        row.matricule.as_deref().unwrap_or("-"),
                        row.reason
                    );
                }
            })?;
        }
        Commands::Export { group, output } => {
            let summary = match output {
                Some(path) => transfer.export_file(&path, group.as_deref())?,
                None => transfer.export_default(group.as_deref())?,
            };
            emit(json, &summary, || {
                println!("Exported {} students to {}", summary.rows, summary.path.display())
            })?;
        }
        Commands::Backup => {
            let path = transfer.backup_now()?;
            emit(json, &path, || println!("Backup created: {}", path.display()))?;
        }
        Commands::Backups => {
            let backups = transfer.list_backups()?;
            emit(json, &backups, || {
                for b in &backups {
                    println!("{}", b.display());
                }
            })?;
        }
        Commands::Run => {
            let scheduler = state.start_auto_backup();
            println!("Running; press Ctrl-C to stop");
            tokio::signal::ctrl_c()
                .await
                .context("等待退出信号失败")?;
            if let Some(handle) = scheduler {
                if let Some(path) = handle.shutdown().await.map_err(ApiError::from)? {
                    println!("Backup created: {}", path.display());
                }
            }
        }
    }

    Ok(())
}

/// 输出结果：--json 时序列化，否则执行文本输出
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}
