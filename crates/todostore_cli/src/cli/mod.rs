use clap::{Parser, Subcommand};
use todostore_core::model::Priority;
use todostore_core::task_api::Tab;

#[derive(Parser, Debug)]
#[command(name = "todostore", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks on a tab
    ///
    /// Example: todostore list
    /// Example: todostore list completed
    List {
        #[arg(value_parser = parse_tab)]
        tab: Option<Tab>,
    },
    /// Show details of a task
    ///
    /// Example: todostore show 1
    Show { id: i64 },
    /// Add a new task
    ///
    /// Example: todostore add "Buy milk" -d "2%" --due 2024-01-01 -p low
    Add {
        name: String,
        #[arg(short = 'd', long)]
        description: String,
        #[arg(long = "due", value_name = "DATE")]
        due_date: String,
        #[arg(short = 'p', long, value_parser = parse_priority, default_value = "low")]
        priority: Priority,
    },
    /// Edit fields of a task
    ///
    /// Example: todostore edit 1 --name "Buy oat milk" -p medium
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(short = 'd', long)]
        description: Option<String>,
        #[arg(long = "due", value_name = "DATE")]
        due_date: Option<String>,
        #[arg(short = 'p', long, value_parser = parse_priority)]
        priority: Option<Priority>,
    },
    /// Mark a task as completed
    ///
    /// Example: todostore done 1
    Done { id: i64 },
    /// Move a completed task back to the open tab
    ///
    /// Example: todostore reopen 1
    Reopen { id: i64 },
    /// Delete a task
    ///
    /// Example: todostore delete 1
    Delete { id: i64 },
    /// Discard every task and restore the bundled database
    ///
    /// Example: todostore reset --yes
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

fn parse_priority(raw: &str) -> Result<Priority, String> {
    raw.parse::<Priority>().map_err(|err| err.message())
}

fn parse_tab(raw: &str) -> Result<Tab, String> {
    raw.parse::<Tab>().map_err(|err| err.message())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    DefaultTab,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "default_tab" | "tab" => {
            parse_tab(&value)?;
            ConfigOverrideTarget::DefaultTab
        }
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
