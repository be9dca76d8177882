//! System Info Tool
//!
//! Operating system, memory, CPU and uptime of the local host.

use async_trait::async_trait;
use serde_json::{json, Value};
use sysinfo::System;
use tracing::info;

use super::{Tool, ToolOutput};
use crate::error::AgentResult;
use crate::forecast::{format_number, round2};

const INFO_TYPES: &[&str] = &["os", "memory", "cpu", "uptime", "all"];

#[derive(Default)]
pub struct SystemInfoTool;

/// Point-in-time host snapshot
#[derive(Debug, Clone)]
pub struct HostSnapshot {
    pub os_name: String,
    pub os_version: String,
    pub arch: String,
    pub hostname: String,
    pub total_memory: u64,
    pub available_memory: u64,
    pub cpu_model: String,
    pub cpu_count: usize,
    pub uptime_secs: u64,
}

impl HostSnapshot {
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os_name: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version()
                .or_else(System::kernel_version)
                .unwrap_or_default(),
            arch: std::env::consts::ARCH.to_string(),
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            total_memory: sys.total_memory(),
            available_memory: sys.available_memory(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .unwrap_or_else(|| "Unknown CPU".to_string()),
            cpu_count: sys.cpus().len(),
            uptime_secs: System::uptime(),
        }
    }

    pub fn os_line(&self) -> String {
        format!("{} {} ({})", self.os_name, self.os_version, self.arch)
    }

    pub fn memory_line(&self) -> String {
        format!(
            "{}GB free of {}GB",
            gigabytes(self.available_memory),
            gigabytes(self.total_memory)
        )
    }

    pub fn cpu_line(&self) -> String {
        format!("{} ({} cores)", self.cpu_model, self.cpu_count)
    }

    pub fn uptime_line(&self) -> String {
        format!("{} hours", self.uptime_secs / 3600)
    }

    /// Text for one `info_type`; `None` for unknown types
    pub fn render(&self, info_type: &str) -> Option<String> {
        let text = match info_type {
            "os" => format!("OS: {}", self.os_line()),
            "memory" => format!("Memory: {} total", self.memory_line()),
            "cpu" => format!("CPU: {}", self.cpu_line()),
            "uptime" => format!("System uptime: {}", self.uptime_line()),
            "all" => format!(
                "System Information:\nos: {}\nhostname: {}\nmemory: {}\ncpu: {}\nuptime: {}",
                self.os_line(),
                self.hostname,
                self.memory_line(),
                self.cpu_line(),
                self.uptime_line()
            ),
            _ => return None,
        };
        Some(text)
    }
}

/// Bytes to gigabytes, two decimals at most
fn gigabytes(bytes: u64) -> String {
    format_number(round2(bytes as f64 / 1024.0 / 1024.0 / 1024.0))
}

#[async_trait]
impl Tool for SystemInfoTool {
    fn name(&self) -> String {
        "system_info".to_string()
    }

    fn description(&self) -> String {
        "Get system information like OS, memory, CPU, etc.".to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "info_type": {
                    "type": "string",
                    "enum": INFO_TYPES,
                    "description": "Type of system information to retrieve"
                }
            },
            "required": ["info_type"]
        })
    }

    fn cacheable(&self) -> bool {
        false
    }

    async fn execute(&self, params: Value) -> AgentResult<ToolOutput> {
        let info_type = params["info_type"].as_str().unwrap_or("all");
        info!("SystemInfoTool: info_type = {}", info_type);

        let snapshot = tokio::task::spawn_blocking(HostSnapshot::collect)
            .await
            .map_err(|e| crate::error::AgentError::Tool(format!("system probe failed: {}", e)))?;

        match snapshot.render(info_type) {
            Some(text) => Ok(ToolOutput::success(
                json!({
                    "os": snapshot.os_line(),
                    "hostname": snapshot.hostname,
                    "total_memory": snapshot.total_memory,
                    "available_memory": snapshot.available_memory,
                    "cpu": snapshot.cpu_line(),
                    "uptime_secs": snapshot.uptime_secs,
                }),
                text,
            )),
            None => Ok(ToolOutput::failure("Invalid system information type")),
        }
    }
}
