use crate::constants::{DEBUG_LOG_MAX_FIELDS, DEBUG_LOG_MESSAGE_MAX_LEN};

/// Runtime settings of an [`Execution`](crate::Execution).
///
/// Only `collect_debug_logs` changes the recorded events: a collected
/// `DEBUGLOG` adds its memory reads and a `debug_log` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSettings {
    /// Whether `DEBUGLOG` records messages.
    pub collect_debug_logs: bool,
    /// Messages longer than this are truncated.
    pub debug_log_message_max_len: usize,
    /// Logs with more fields than this are dropped unread.
    pub debug_log_max_fields: u32,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            collect_debug_logs: false,
            debug_log_message_max_len: DEBUG_LOG_MESSAGE_MAX_LEN,
            debug_log_max_fields: DEBUG_LOG_MAX_FIELDS,
        }
    }
}

impl ExecutionSettings {
    pub const fn with_debug_logs(mut self, collect_debug_logs: bool) -> Self {
        self.collect_debug_logs = collect_debug_logs;
        self
    }

    pub const fn with_debug_log_message_max_len(mut self, max_len: usize) -> Self {
        self.debug_log_message_max_len = max_len;
        self
    }

    pub const fn with_debug_log_max_fields(mut self, max_fields: u32) -> Self {
        self.debug_log_max_fields = max_fields;
        self
    }
}
