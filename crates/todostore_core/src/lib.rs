pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod task_api;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{Priority, Task, TaskStatus};

    #[test]
    fn new_task_has_no_id() {
        let task = Task {
            id: 0,
            name: "demo".to_string(),
            priority: Priority::Medium,
            description: "desc".to_string(),
            status: TaskStatus::Open,
            due_date: "2025-12-20".to_string(),
        };

        assert!(task.is_new());
        assert_eq!(task.status, TaskStatus::Open);
    }

    #[test]
    fn app_error_exposes_code_and_message() {
        let err = AppError::invalid_input("missing name");
        assert_eq!(err.code(), "invalid_input");
        assert_eq!(err.message(), "missing name");
        assert_eq!(err.to_string(), "invalid_input - missing name");

        let err = AppError::NotFound(4);
        assert_eq!(err.code(), "not_found");
        assert_eq!(err.to_string(), "not_found - task 4 not found");
    }
}
