//! CRUD over the `todos` table.
//!
//! Each call opens its own connection and closes it before returning.
//! Failures are logged here and returned to the caller with their kind intact.

use crate::error::{AppError, read_failed_from, write_failed_from};
use crate::model::{Priority, Task, TaskStatus};
use crate::storage::store::Store;
use rusqlite::{OptionalExtension, Row, params};

const INSERT_TODO: &str = "INSERT INTO todos (name, priority, description, status, dueDate)
    VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_TODO: &str = "UPDATE todos
    SET name = ?1, priority = ?2, description = ?3, status = ?4, dueDate = ?5
    WHERE id = ?6";
const DELETE_TODO: &str = "DELETE FROM todos WHERE id = ?1";
const SELECT_TODOS: &str =
    "SELECT id, name, priority, description, status, dueDate FROM todos ORDER BY id";
const SELECT_TODO_BY_ID: &str =
    "SELECT id, name, priority, description, status, dueDate FROM todos WHERE id = ?1";

pub trait TaskRepository {
    /// Stores every field except `id` and returns the task with its new id.
    fn insert(&self, task: &Task) -> Result<Task, AppError>;

    /// Overwrites the row matching `task.id`.
    fn update(&self, task: &Task) -> Result<Task, AppError>;

    fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Every stored task. An empty table gives an empty vector.
    fn list_all(&self) -> Result<Vec<Task>, AppError>;

    fn get(&self, id: i64) -> Result<Task, AppError>;
}

#[derive(Debug, Clone)]
pub struct SqliteTaskRepository {
    store: Store,
}

impl SqliteTaskRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(Store::from_env()?))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn insert(&self, task: &Task) -> Result<Task, AppError> {
        validate_fields(task)?;

        let conn = self.store.open_for_write()?;
        conn.execute(
            INSERT_TODO,
            params![
                task.name,
                task.priority.as_str(),
                task.description,
                task.status.as_str(),
                task.due_date
            ],
        )
        .map_err(|err| {
            tracing::error!(error = %err, "insert failed");
            write_failed_from("insert", err)
        })?;

        let id = conn.last_insert_rowid();
        tracing::debug!(id, "task inserted");
        Ok(Task {
            id,
            ..task.clone()
        })
    }

    fn update(&self, task: &Task) -> Result<Task, AppError> {
        validate_id(task.id)?;
        validate_fields(task)?;

        let conn = self.store.open_for_write()?;
        let affected = conn
            .execute(
                UPDATE_TODO,
                params![
                    task.name,
                    task.priority.as_str(),
                    task.description,
                    task.status.as_str(),
                    task.due_date,
                    task.id
                ],
            )
            .map_err(|err| {
                tracing::error!(id = task.id, error = %err, "update failed");
                write_failed_from("update", err)
            })?;

        if affected == 0 {
            tracing::warn!(id = task.id, "update matched no task");
            return Err(AppError::NotFound(task.id));
        }

        tracing::debug!(id = task.id, "task updated");
        Ok(task.clone())
    }

    fn delete(&self, id: i64) -> Result<(), AppError> {
        let conn = self.store.open_for_write()?;
        let affected = conn.execute(DELETE_TODO, params![id]).map_err(|err| {
            tracing::error!(id, error = %err, "delete failed");
            write_failed_from("delete", err)
        })?;

        if affected == 0 {
            tracing::warn!(id, "delete matched no task");
            return Err(AppError::NotFound(id));
        }

        tracing::debug!(id, "task deleted");
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Task>, AppError> {
        let conn = self.store.open_for_read()?;
        let mut stmt = conn.prepare(SELECT_TODOS).map_err(|err| {
            tracing::error!(error = %err, "query failed");
            read_failed_from(err)
        })?;
        let rows = stmt
            .query_map([], StoredRow::from_row)
            .map_err(read_failed_from)?;

        let mut tasks = Vec::new();
        for row in rows {
            let row = row.map_err(|err| {
                tracing::error!(error = %err, "reading row failed");
                read_failed_from(err)
            })?;
            tasks.push(row.into_task()?);
        }

        Ok(tasks)
    }

    fn get(&self, id: i64) -> Result<Task, AppError> {
        let conn = self.store.open_for_read()?;
        let row = conn
            .query_row(SELECT_TODO_BY_ID, params![id], StoredRow::from_row)
            .optional()
            .map_err(|err| {
                tracing::error!(id, error = %err, "query failed");
                read_failed_from(err)
            })?;

        match row {
            Some(row) => row.into_task(),
            None => Err(AppError::NotFound(id)),
        }
    }
}

/// A row as SQLite hands it back, before enum columns are checked.
struct StoredRow {
    id: i64,
    name: Option<String>,
    priority: Option<String>,
    description: Option<String>,
    status: Option<String>,
    due_date: Option<String>,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            priority: row.get(2)?,
            description: row.get(3)?,
            status: row.get(4)?,
            due_date: row.get(5)?,
        })
    }

    fn into_task(self) -> Result<Task, AppError> {
        let priority = self.priority.unwrap_or_default();
        let priority = priority.parse::<Priority>().map_err(|_| {
            AppError::invalid_data(format!("task {} has unknown priority '{}'", self.id, priority))
        })?;
        let status = self.status.unwrap_or_default();
        let status = status.parse::<TaskStatus>().map_err(|_| {
            AppError::invalid_data(format!("task {} has unknown status '{}'", self.id, status))
        })?;

        Ok(Task {
            id: self.id,
            name: self.name.unwrap_or_default(),
            priority,
            description: self.description.unwrap_or_default(),
            status,
            due_date: self.due_date.unwrap_or_default(),
        })
    }
}

fn validate_id(id: i64) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(())
}

fn validate_fields(task: &Task) -> Result<(), AppError> {
    if task.name.trim().is_empty() {
        return Err(AppError::invalid_input("name is required"));
    }
    Ok(())
}
