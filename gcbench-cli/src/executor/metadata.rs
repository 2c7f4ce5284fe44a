//! System Metadata Collection
//!
//! Collects system information for report metadata including CPU, memory,
//! OS details, and the JVM version.
//!
//! Linux-specific data (CPU model, memory) gracefully degrades on other
//! platforms, returning "Unknown" or 0 values.

use chrono::Utc;
use gcbench_core::RunConfiguration;
use gcbench_report::{ReportConfig, ReportMeta, SCHEMA_VERSION, SystemInfo};
use std::path::Path;

/// Build report metadata including system info and the run configuration
pub fn build_report_meta(config: &RunConfiguration, java_version: Option<String>) -> ReportMeta {
    let system = SystemInfo {
        os: std::env::consts::OS.to_string(),
        os_version: std::env::consts::ARCH.to_string(),
        cpu: get_cpu_model().unwrap_or_else(|| "Unknown".to_string()),
        cpu_cores: num_cpus(),
        memory_gb: get_memory_gb().unwrap_or(0.0),
        java_version,
    };

    ReportMeta {
        schema_version: SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        artifact: config.artifact().file_name(),
        system,
        config: ReportConfig::from(config),
    }
}

/// First line of `<java> -version` (printed on stderr by the JVM)
pub fn detect_java_version(java: &Path) -> Option<String> {
    let output = std::process::Command::new(java)
        .arg("-version")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = if output.stderr.is_empty() {
        output.stdout
    } else {
        output.stderr
    };
    String::from_utf8_lossy(&text)
        .lines()
        .next()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

/// Get CPU model name from /proc/cpuinfo (Linux only)
fn get_cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|l| l.starts_with("model name"))
                    .and_then(|l| l.split(':').nth(1))
                    .map(|s| s.trim().to_string())
            })
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Get number of available CPU cores
fn num_cpus() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

/// Get total system memory in GB (Linux only)
fn get_memory_gb() -> Option<f64> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|l| l.starts_with("MemTotal"))
                    .and_then(|l| {
                        l.split_whitespace()
                            .nth(1)
                            .and_then(|s| s.parse::<u64>().ok())
                    })
                    .map(|kb| kb as f64 / 1024.0 / 1024.0)
            })
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcbench_core::RunSettings;

    #[test]
    fn test_meta_echoes_configuration() {
        let config = RunConfiguration::validate(&RunSettings::new("lib/app.jar")).unwrap();
        let meta = build_report_meta(&config, Some("openjdk version \"21\"".to_string()));
        assert_eq!(meta.artifact, "app.jar");
        assert_eq!(meta.config.runs, 3);
        assert_eq!(meta.config.collectors.len(), 5);
        assert!(meta.system.cpu_cores >= 1);
    }

    #[test]
    fn test_missing_java_has_no_version() {
        assert_eq!(detect_java_version(Path::new("/nonexistent/bin/java")), None);
    }
}
