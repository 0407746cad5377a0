pub mod bootstrap;
pub mod migrations;
pub mod repository;
pub mod store;

use crate::error::AppError;
use std::path::PathBuf;

pub const DATABASE_NAME: &str = "todo.db";
const DATA_DIR_ENV_VAR: &str = "TODOSTORE_DATA_DIR";

/// Directory holding the writable database.
pub fn data_dir() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(DATA_DIR_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("todostore"))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("todostore"))
    }
}

pub fn store_path() -> Result<PathBuf, AppError> {
    Ok(data_dir()?.join(DATABASE_NAME))
}
