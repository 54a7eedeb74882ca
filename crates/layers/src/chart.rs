//! Binding annotation plot specs to the chart panel.

use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
pub enum ChartCommand {
    /// Render this (data-complete) spec.
    Render(Value),
    Hide,
}

/// Merges cached time-series rows into plot specs.
///
/// Rows are loaded once, asynchronously. A spec that embeds its own `data`
/// renders immediately; one that relies on the shared rows is held back
/// until they arrive, and the most recent such spec wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartBinding {
    rows: Option<Vec<Value>>,
    pending: Option<Value>,
}

impl ChartBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows_loaded(&self) -> bool {
        self.rows.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Rebind to a new spec. `None` means the selection has no chart.
    pub fn bind(&mut self, spec: Option<&Value>) -> ChartCommand {
        self.pending = None;
        let Some(spec) = spec else {
            return ChartCommand::Hide;
        };
        if embeds_data(spec) {
            return ChartCommand::Render(spec.clone());
        }
        match &self.rows {
            Some(rows) => ChartCommand::Render(merge_rows(spec, rows)),
            None => {
                tracing::debug!("chart rows not loaded yet, holding spec");
                self.pending = Some(spec.clone());
                ChartCommand::Hide
            }
        }
    }

    /// Store the loaded rows; returns a render for a held spec, if any.
    pub fn set_rows(&mut self, rows: Vec<Value>) -> Option<ChartCommand> {
        let pending = self.pending.take();
        let cmd = pending.map(|spec| ChartCommand::Render(merge_rows(&spec, &rows)));
        self.rows = Some(rows);
        cmd
    }
}

fn embeds_data(spec: &Value) -> bool {
    spec.get("data").is_some_and(|d| !d.is_null())
}

fn merge_rows(spec: &Value, rows: &[Value]) -> Value {
    let mut out = spec.clone();
    if let Some(obj) = out.as_object_mut() {
        obj.insert("data".to_string(), json!({ "values": rows }));
    }
    out
}
