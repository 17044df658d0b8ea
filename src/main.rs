//! todocal CLI - list and calendar views over a local task store.

use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use todocal::{CalendarGrid, Config, ExportFormatter, Locale, MonthRef, Task, TaskStore, export_filename, parse_date};

mod cli;

use cli::{Cli, Command};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todocal")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("todocal.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn get_store_dir(cli: &Cli, config: &Config) -> PathBuf {
    cli.dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn format_task(task: &Task, locale: Locale, today: NaiveDate) -> String {
    let check = if task.completed { "✓".green() } else { "○".normal() };
    let text = if task.completed {
        task.text.dimmed().strikethrough()
    } else {
        task.text.normal()
    };
    format!(
        "{} {} {} {}",
        check,
        task.id.to_string().cyan(),
        text,
        format!("({})", locale.display_date(task.date, today)).dimmed()
    )
}

/// Ask a yes/no question on stdin; anything but y/yes declines.
fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;

    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_calendar(grid: &CalendarGrid, locale: Locale) {
    println!("{}", locale.month_title(grid.month).bold());
    println!(
        "{}",
        locale
            .weekday_headers()
            .iter()
            .map(|h| format!("{:>4}", h))
            .collect::<String>()
            .dimmed()
    );

    for week in grid.weeks() {
        let row: String = week
            .iter()
            .map(|cell| {
                let marker = if cell.total() > 0 { "*" } else { " " };
                let label = format!("{:>3}{}", cell.date.day(), marker);
                if cell.is_today {
                    label.reversed().to_string()
                } else if !cell.in_month {
                    label.dimmed().to_string()
                } else {
                    label
                }
            })
            .collect();
        println!("{}", row);
    }

    let busy: Vec<_> = grid.cells.iter().filter(|c| c.in_month && c.total() > 0).collect();
    if !busy.is_empty() {
        println!();
    }
    for cell in busy {
        let mut texts: Vec<String> = cell.tasks.iter().map(|t| t.text.clone()).collect();
        if cell.overflow > 0 {
            texts.push(locale.more(cell.overflow));
        }
        println!("  {}: {}", locale.month_day(cell.date).cyan(), texts.join(", "));
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    let locale = match &cli.locale {
        Some(raw) => raw.parse::<Locale>().map_err(|e| eyre::eyre!(e))?,
        None => config.locale,
    };
    let store_dir = get_store_dir(&cli, &config);
    let today = Local::now().date_naive();

    match cli.command {
        Command::Add { text, date } => {
            let mut store = config.open_store(&store_dir)?;
            let task = match date {
                Some(raw) => store.add(&text, &raw),
                None => store.add_on(&text, today),
            }
            .context("Failed to add task")?;

            println!("{} Added: {}", "✓".green(), format_task(&task, locale, today));
        }

        Command::List => {
            let store = config.open_store(&store_dir)?;
            let tasks = store.list();

            if tasks.is_empty() {
                println!("{}", "No tasks".dimmed());
            } else {
                for task in &tasks {
                    println!("{}", format_task(task, locale, today));
                }
            }
        }

        Command::Day { date } => {
            let store = config.open_store(&store_dir)?;
            let date = parse_date(&date).map_err(|e| eyre::eyre!(e))?;
            let tasks = store.tasks_on_date(date);

            println!("{}", locale.display_date(date, today).bold());
            if tasks.is_empty() {
                println!("{}", "No tasks".dimmed());
            }
            for task in &tasks {
                println!("  {}", format_task(task, locale, today));
            }
        }

        Command::Done { id } => {
            let mut store = config.open_store(&store_dir)?;
            let task = store.toggle_complete(id)?;

            let state = if task.completed { "Done".green() } else { "Reopened".yellow() };
            println!("{}: {}", state, format_task(&task, locale, today));
        }

        Command::Edit { id, text } => {
            let mut store = config.open_store(&store_dir)?;
            let task = store.edit(id, &text)?;

            println!("{} Edited: {}", "✓".green(), format_task(&task, locale, today));
        }

        Command::Rm { id, yes } => {
            let mut store = config.open_store(&store_dir)?;
            let Some(task) = store.get(id).cloned() else {
                println!("{} No task with id {}", "✗".red(), id);
                std::process::exit(1);
            };

            if !yes && !confirm(&format!("Delete \"{}\"?", task.text))? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }

            store.remove(id)?;
            println!("{} Deleted: {} {}", "✓".green(), id.to_string().cyan(), task.text);
        }

        Command::Calendar { month, offset } => {
            let store = config.open_store(&store_dir)?;
            let base = match month {
                Some(raw) => MonthRef::parse(&raw).ok_or_else(|| eyre::eyre!("Invalid month '{}': expected YYYY-MM", raw))?,
                None => MonthRef::from_date(today),
            };

            let target = base
                .shift(offset)
                .ok_or_else(|| eyre::eyre!("Month offset {} from {} is out of range", offset, base))?;
            let grid = CalendarGrid::build(&store, target, today)?;
            print_calendar(&grid, locale);
        }

        Command::Export { output } => {
            let store = config.open_store(&store_dir)?;
            if store.is_empty() {
                println!("{}", "No tasks to export".dimmed());
                return Ok(());
            }

            let now = Local::now().naive_local();
            let report = ExportFormatter::new(locale).format(store.tasks(), now)?;

            let dir = output.unwrap_or_else(|| PathBuf::from("."));
            let path = dir.join(export_filename(now.date()));
            fs::write(&path, report).with_context(|| format!("Failed to write {}", path.display()))?;

            println!("{} Exported {} tasks to {}", "✓".green(), store.len(), path.display());
        }

        Command::Stats => {
            let store = config.open_store(&store_dir)?;
            let stats = store.stats();

            println!("{}: {}", "Total".bold(), stats.total);
            println!("{}: {}", "Completed".bold(), stats.completed.to_string().green());
            println!("{}: {}", "Pending".bold(), stats.pending.to_string().yellow());
            if let Some(percent) = stats.percent_complete() {
                println!("{}: {}%", "Completion".bold(), percent);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
