//! Diagnostics
//!
//! Read-only report over both partitions: raw key/value tables plus a
//! best-effort JSON view of every value. The report only assembles data;
//! the service logs it and callers decide how to present it further.

use std::fmt;

use serde_json::Value;

use crate::model::Scope;

/// Snapshot of both partitions for inspection
#[derive(Debug, Clone)]
pub struct StorageReport {
    global_label: String,
    workspace_label: String,
    global_rows: Vec<(String, String)>,
    workspace_rows: Vec<(String, String)>,
}

impl StorageReport {
    pub fn new(
        global_label: impl Into<String>,
        workspace_label: impl Into<String>,
        global_rows: Vec<(String, String)>,
        workspace_rows: Vec<(String, String)>,
    ) -> Self {
        Self {
            global_label: global_label.into(),
            workspace_label: workspace_label.into(),
            global_rows,
            workspace_rows,
        }
    }

    /// Display label of a partition (file path or identifier)
    pub fn label(&self, scope: Scope) -> &str {
        match scope {
            Scope::Global => &self.global_label,
            Scope::Workspace => &self.workspace_label,
        }
    }

    /// Raw (key, value) rows of a partition
    pub fn rows(&self, scope: Scope) -> &[(String, String)] {
        match scope {
            Scope::Global => &self.global_rows,
            Scope::Workspace => &self.workspace_rows,
        }
    }

    /// Each value parsed as JSON, or kept as a JSON string if it isn't JSON
    pub fn parsed(&self, scope: Scope) -> Vec<(String, Value)> {
        self.rows(scope)
            .iter()
            .map(|(key, raw)| {
                let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()));
                (key.clone(), value)
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.global_rows.is_empty() && self.workspace_rows.is_empty()
    }

    fn write_table(&self, f: &mut fmt::Formatter<'_>, scope: Scope) -> fmt::Result {
        let rows = self.rows(scope);
        writeln!(f, "{} storage ({}):", title(scope), self.label(scope))?;

        if rows.is_empty() {
            return writeln!(f, "  (empty)");
        }

        let key_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0).max(3);
        writeln!(f, "  {:<width$} | value", "key", width = key_width)?;
        writeln!(f, "  {:-<width$}-+------", "", width = key_width)?;
        for (key, value) in rows {
            writeln!(f, "  {:<width$} | {}", key, value, width = key_width)?;
        }
        Ok(())
    }

    fn write_parsed(&self, f: &mut fmt::Formatter<'_>, scope: Scope) -> fmt::Result {
        writeln!(f, "{} storage (parsed):", title(scope))?;

        let mut object = serde_json::Map::new();
        for (key, value) in self.parsed(scope) {
            object.insert(key, value);
        }
        let rendered = serde_json::to_string_pretty(&Value::Object(object)).map_err(|_| fmt::Error)?;
        for line in rendered.lines() {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}

fn title(scope: Scope) -> &'static str {
    match scope {
        Scope::Global => "Global",
        Scope::Workspace => "Workspace",
    }
}

impl fmt::Display for StorageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for scope in Scope::ALL {
            self.write_table(f, scope)?;
            writeln!(f)?;
        }
        for scope in Scope::ALL {
            self.write_parsed(f, scope)?;
        }
        Ok(())
    }
}
