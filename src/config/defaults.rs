use super::*;

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/lifescope.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_threads: 4,
            max_blocking_threads: 64,
            thread_name: "lifescope-io".to_string(),
            thread_keep_alive_ms: 60_000,
        }
    }
}
