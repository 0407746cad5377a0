use crate::error::AppError;
use crate::model::{Priority, Task, TaskStatus};
use crate::storage::repository::TaskRepository;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// Which slice of the list a view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Open,
    Completed,
    All,
}

impl FromStr for Tab {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "completed" | "done" => Ok(Self::Completed),
            "all" => Ok(Self::All),
            other => Err(AppError::invalid_input(format!(
                "tab must be open, completed or all (got '{other}')"
            ))),
        }
    }
}

/// Field changes for [`edit`]. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.priority.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
    }
}

/// Builds an unsaved task. Every text field must be non-blank.
pub fn draft(
    name: &str,
    priority: Priority,
    description: &str,
    due_date: &str,
) -> Result<Task, AppError> {
    Ok(Task {
        id: 0,
        name: required("name", name)?,
        priority,
        description: required("description", description)?,
        status: TaskStatus::Open,
        due_date: required("due date", due_date)?,
    })
}

pub fn load<R: TaskRepository + ?Sized>(repo: &R) -> Result<Vec<Task>, AppError> {
    repo.list_all()
}

pub fn get_task<R: TaskRepository + ?Sized>(repo: &R, id: i64) -> Result<Task, AppError> {
    repo.get(id)
}

/// Inserts tasks that have no id yet and updates the rest.
pub fn save<R: TaskRepository + ?Sized>(repo: &R, task: &Task) -> Result<Task, AppError> {
    if task.is_new() {
        repo.insert(task)
    } else {
        repo.update(task)
    }
}

pub fn edit<R: TaskRepository + ?Sized>(
    repo: &R,
    id: i64,
    changes: &TaskEdit,
) -> Result<Task, AppError> {
    if changes.is_empty() {
        return Err(AppError::invalid_input("nothing to change"));
    }

    let mut task = repo.get(id)?;
    if let Some(name) = changes.name.as_deref() {
        task.name = required("name", name)?;
    }
    if let Some(priority) = changes.priority {
        task.priority = priority;
    }
    if let Some(description) = changes.description.as_deref() {
        task.description = required("description", description)?;
    }
    if let Some(due_date) = changes.due_date.as_deref() {
        task.due_date = required("due date", due_date)?;
    }

    repo.update(&task)
}

/// Removes the task and returns what was stored.
pub fn delete_by_id<R: TaskRepository + ?Sized>(repo: &R, id: i64) -> Result<Task, AppError> {
    let task = repo.get(id)?;
    repo.delete(id)?;
    Ok(task)
}

pub fn complete<R: TaskRepository + ?Sized>(repo: &R, id: i64) -> Result<Task, AppError> {
    set_status(repo, id, TaskStatus::Completed)
}

pub fn reopen<R: TaskRepository + ?Sized>(repo: &R, id: i64) -> Result<Task, AppError> {
    set_status(repo, id, TaskStatus::Open)
}

fn set_status<R: TaskRepository + ?Sized>(
    repo: &R,
    id: i64,
    status: TaskStatus,
) -> Result<Task, AppError> {
    let task = repo.get(id)?;
    repo.update(&task.with_status(status))
}

/// Splits tasks into the open and completed tabs, keeping their order.
pub fn partition_by_status(tasks: &[Task]) -> (Vec<Task>, Vec<Task>) {
    tasks
        .iter()
        .cloned()
        .partition(|task| task.status == TaskStatus::Open)
}

pub fn tasks_for_tab(tasks: &[Task], tab: Tab) -> Vec<Task> {
    match tab {
        Tab::All => tasks.to_vec(),
        Tab::Open => partition_by_status(tasks).0,
        Tab::Completed => partition_by_status(tasks).1,
    }
}

/// Open tasks whose `YYYY-MM-DD` due date is before `today`.
///
/// Due dates in any other format are never overdue.
pub fn is_overdue(task: &Task, today: Date) -> bool {
    if task.status != TaskStatus::Open {
        return false;
    }

    match parse_due_date(&task.due_date) {
        Some(due) => due < today,
        None => false,
    }
}

pub fn parse_due_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

pub fn today_local() -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
