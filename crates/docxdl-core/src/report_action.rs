//! Registry of named report-action handlers, as a web client host keeps them.
//!
//! Handlers see each report action before the host runs it and return `true`
//! to take it over. The only built-in handler, `docx_rename_handler`, is an
//! observability hook: it logs DOCX report actions and always declines, since
//! renaming happens later in the download path.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DOCX_RENAME_HANDLER: &str = "docx_rename_handler";

/// A report action as the host delivers it (`ir.actions.report`-shaped).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportAction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub report_name: Option<String>,
    #[serde(default)]
    pub report_type: Option<String>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

pub type ReportActionHandler =
    Box<dyn Fn(&ReportAction, &Map<String, Value>) -> bool + Send + Sync>;

#[derive(Default)]
pub struct ReportActionRegistry {
    handlers: Vec<(String, ReportActionHandler)>,
}

impl ReportActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, handler: ReportActionHandler) -> Result<()> {
        if self.contains(name) {
            bail!("report action handler {:?} is already registered", name);
        }
        self.handlers.push((name.to_string(), handler));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|(n, _)| n.as_str())
    }

    /// Offers `action` to each handler in registration order. Returns `true` as
    /// soon as one takes it over; `false` means the host should run it itself.
    pub fn dispatch(&self, action: &ReportAction, options: &Map<String, Value>) -> bool {
        for (name, handler) in &self.handlers {
            if handler(action, options) {
                tracing::debug!(handler = %name, "report action intercepted");
                return true;
            }
        }
        false
    }
}

/// Registers the built-in handlers.
pub fn register_defaults(registry: &mut ReportActionRegistry) -> Result<()> {
    registry.add(DOCX_RENAME_HANDLER, Box::new(docx_rename_handler))
}

fn docx_rename_handler(action: &ReportAction, _options: &Map<String, Value>) -> bool {
    if let Some(name) = action.name.as_deref().filter(|n| n.contains("DOCX")) {
        tracing::info!(
            report = action.report_name.as_deref().unwrap_or("-"),
            "DOCX report action {:?}; download will be renamed",
            name
        );
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn action(name: &str) -> ReportAction {
        ReportAction {
            name: Some(name.to_string()),
            report_name: Some("bd_calling_billing_management.without_test_pdf".into()),
            report_type: Some("qweb-pdf".into()),
            ..Default::default()
        }
    }

    #[test]
    fn builtin_handler_always_declines() {
        let mut reg = ReportActionRegistry::new();
        register_defaults(&mut reg).unwrap();
        assert!(reg.contains(DOCX_RENAME_HANDLER));
        assert!(!reg.dispatch(&action("Quotation DOCX"), &Map::new()));
        assert!(!reg.dispatch(&action("Quotation"), &Map::new()));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut reg = ReportActionRegistry::new();
        register_defaults(&mut reg).unwrap();
        assert!(register_defaults(&mut reg).is_err());
        assert_eq!(reg.names().count(), 1);
    }

    #[test]
    fn first_accepting_handler_wins() {
        let later_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&later_calls);
        let mut reg = ReportActionRegistry::new();
        register_defaults(&mut reg).unwrap();
        reg.add(
            "xlsx",
            Box::new(|a: &ReportAction, _: &Map<String, Value>| {
                a.report_type.as_deref() == Some("xlsx")
            }),
        )
        .unwrap();
        reg.add(
            "count",
            Box::new(move |_: &ReportAction, _: &Map<String, Value>| {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            }),
        )
        .unwrap();

        let mut xlsx = action("Sheet");
        xlsx.report_type = Some("xlsx".into());
        assert!(reg.dispatch(&xlsx, &Map::new()));
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);

        assert!(!reg.dispatch(&action("Other"), &Map::new()));
        assert_eq!(later_calls.load(Ordering::SeqCst), 1);
        assert_eq!(reg.names().collect::<Vec<_>>(), ["docx_rename_handler", "xlsx", "count"]);
    }

    #[test]
    fn action_deserializes_with_extra_fields() {
        let a: ReportAction = serde_json::from_value(json!({
            "name": "Invoice DOCX",
            "report_name": "account.report_invoice",
            "report_type": "qweb-pdf",
            "context": {"active_ids": [1, 2]}
        }))
        .unwrap();
        assert_eq!(a.name.as_deref(), Some("Invoice DOCX"));
        assert!(a.extra.contains_key("context"));
    }
}
