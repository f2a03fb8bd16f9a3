//! System information tool: local time, date and platform.

use async_trait::async_trait;
use chrono::Local;
use sdk::{EngineError, Parameters, Tool};
use serde_json::{json, Value};

#[derive(Debug, Default)]
pub struct SystemTool;

impl SystemTool {
    pub fn new() -> Self {
        Self
    }

    fn os_info() -> String {
        format!(
            "{} {} ({})",
            std::env::consts::OS,
            std::env::consts::FAMILY,
            std::env::consts::ARCH
        )
    }
}

#[async_trait]
impl Tool for SystemTool {
    fn name(&self) -> &str {
        "system"
    }

    fn description(&self) -> &str {
        "Current time, date and operating system details"
    }

    async fn execute(&self, params: &Parameters) -> Result<Value, EngineError> {
        let action = params.str_opt("action").unwrap_or("time");
        let text = match action {
            "time" => Local::now().format("%H:%M:%S").to_string(),
            "date" => Local::now().format("%Y-%m-%d").to_string(),
            "os_info" => Self::os_info(),
            other => {
                return Err(EngineError::UnknownOperation(format!(
                    "system action '{}'",
                    other
                )))
            }
        };
        Ok(json!(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    async fn run(action: &str) -> Result<Value, EngineError> {
        SystemTool::new()
            .execute(&Parameters::new().with("action", action))
            .await
    }

    #[tokio::test]
    async fn test_time_and_date_formats() {
        let time = run("time").await.unwrap();
        assert!(Regex::new(r"^\d{2}:\d{2}:\d{2}$")
            .unwrap()
            .is_match(time.as_str().unwrap()));

        let date = run("date").await.unwrap();
        assert!(Regex::new(r"^\d{4}-\d{2}-\d{2}$")
            .unwrap()
            .is_match(date.as_str().unwrap()));
    }

    #[tokio::test]
    async fn test_os_info_names_platform() {
        let info = run("os_info").await.unwrap();
        assert!(info.as_str().unwrap().contains(std::env::consts::OS));
    }

    #[tokio::test]
    async fn test_unknown_action() {
        assert!(matches!(
            run("reboot").await.unwrap_err(),
            EngineError::UnknownOperation(_)
        ));
    }
}
