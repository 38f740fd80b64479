use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub students_csv: PathBuf,
    pub report_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("Failed to parse PORT")?,
            students_csv: env::var("STUDENTS_CSV")
                .unwrap_or_else(|_| "students.csv".to_string())
                .into(),
            report_dir: env::var("REPORT_DIR")
                .unwrap_or_else(|_| "generated_outputs".to_string())
                .into(),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
