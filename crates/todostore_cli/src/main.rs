use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::Date;
use todostore_cli::cli::{Cli, Command, ConfigOverrideTarget, parse_config_override};
use todostore_core::config::{self, Config, ConfigOverrides, Palette};
use todostore_core::error::AppError;
use todostore_core::logging::{self, Profile};
use todostore_core::model::Task;
use todostore_core::storage::repository::SqliteTaskRepository;
use todostore_core::task_api::{self, Tab, TaskEdit};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Due")]
    due_date: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn status_label(task: &Task, today: Date) -> String {
    if task_api::is_overdue(task, today) {
        format!("{} (overdue)", task.status)
    } else {
        task.status.to_string()
    }
}

fn tab_label(tab: Tab) -> &'static str {
    match tab {
        Tab::Open => "Open",
        Tab::Completed => "Completed",
        Tab::All => "All",
    }
}

fn print_tasks_table(tasks: &[Task], tab: Tab) {
    let today = task_api::today_local();
    println!("{} ({})", tab_label(tab), tasks.len());
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id,
        name: task.name.clone(),
        priority: task.priority.to_string(),
        due_date: task.due_date.clone(),
        status: status_label(task, today),
        description: task.description.clone(),
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn task_json(task: &Task, today: Date) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "name": task.name,
        "priority": task.priority,
        "description": task.description,
        "status": task.status,
        "dueDate": task.due_date,
        "overdue": task_api::is_overdue(task, today),
    })
}

fn print_tasks_json(tasks: &[Task]) {
    let today = task_api::today_local();
    let payload: Vec<serde_json::Value> = tasks.iter().map(|task| task_json(task, today)).collect();
    println!("{}", serde_json::Value::Array(payload));
}

fn print_task_json(task: &Task) {
    println!("{}", task_json(task, task_api::today_local()));
}

fn print_task_details(task: &Task, palette: &Palette) {
    println!("ID:          {}", task.id);
    println!("Name:        {}", task.name);
    println!("Priority:    {}", palette.paint_priority(task.priority));
    println!("Due:         {}", task.due_date);
    println!(
        "Status:      {}",
        status_label(task, task_api::today_local())
    );
    println!("Description: {}", task.description);
}

fn print_tab(repo: &SqliteTaskRepository, tab: Tab, json: bool) -> Result<(), AppError> {
    let tasks = task_api::load(repo)?;
    let visible = task_api::tasks_for_tab(&tasks, tab);
    if json {
        print_tasks_json(&visible);
    } else {
        print_tasks_table(&visible, tab);
    }
    Ok(())
}

fn report(verb: &str, task: &Task, json: bool) {
    if json {
        print_task_json(task);
    } else {
        println!("{} task: {} ({})", verb, task.name, task.id);
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn resolve_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        eprintln!("WARNING: {}", err);
    }

    let mut overrides = ConfigOverrides::default();
    for raw in raw_overrides {
        let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::DefaultTab => overrides.default_tab = Some(parsed.value.parse()?),
        }
    }

    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn is_mutation(command: &Command) -> bool {
    !matches!(command, Command::List { .. } | Command::Show { .. })
}

fn run_command(cli: Cli, repo: &SqliteTaskRepository) -> Result<(), AppError> {
    tracing::debug!(command = ?cli.command, store = %repo.store().path().display(), "running command");
    let config = resolve_config(&cli.config_override)?;

    match cli.command {
        Command::List { tab } => {
            print_tab(repo, tab.unwrap_or(config.tab()), cli.json)?;
        }
        Command::Show { id } => {
            let task = task_api::get_task(repo, id)?;
            if cli.json {
                print_task_json(&task);
            } else {
                print_task_details(&task, &config.palette());
            }
        }
        Command::Add {
            name,
            description,
            due_date,
            priority,
        } => {
            let draft = task_api::draft(&name, priority, &description, &due_date)?;
            let task = task_api::save(repo, &draft)?;
            report("Added", &task, cli.json);
        }
        Command::Edit {
            id,
            name,
            description,
            due_date,
            priority,
        } => {
            let changes = TaskEdit {
                name,
                priority,
                description,
                due_date,
            };
            let task = task_api::edit(repo, id, &changes)?;
            report("Updated", &task, cli.json);
        }
        Command::Done { id } => {
            let task = task_api::complete(repo, id)?;
            report("Completed", &task, cli.json);
        }
        Command::Reopen { id } => {
            let task = task_api::reopen(repo, id)?;
            report("Reopened", &task, cli.json);
        }
        Command::Delete { id } => {
            let task = task_api::delete_by_id(repo, id)?;
            report("Deleted", &task, cli.json);
        }
        Command::Reset { yes } => {
            if !yes {
                return Err(AppError::invalid_input(
                    "reset discards every task; pass --yes to confirm",
                ));
            }
            repo.store().reset()?;
            if cli.json {
                println!("{}", serde_json::json!({ "reset": true }));
            } else {
                println!("Database reset to its initial contents");
            }
        }
    }

    Ok(())
}

fn run_interactive(repo: &SqliteTaskRepository) -> Result<(), AppError> {
    let start_tab = resolve_config(&[])?.tab();
    print_tab(repo, start_tab, false)?;

    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("todostore".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        let refresh = is_mutation(&cli.command) && !cli.json;
        match run_command(cli, repo) {
            Ok(()) if refresh => {
                if let Err(err) = print_tab(repo, start_tab, false) {
                    eprintln!("ERROR: {}", err);
                }
            }
            Ok(()) => {}
            Err(err) => eprintln!("ERROR: {}", err),
        }
    }

    Ok(())
}

fn open_repository() -> SqliteTaskRepository {
    match SqliteTaskRepository::from_env() {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    }
}

fn main() {
    logging::init(Profile::Cli);

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        let repo = open_repository();
        if let Err(err) = run_interactive(&repo) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let repo = open_repository();
    if let Err(err) = run_command(cli, &repo) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
