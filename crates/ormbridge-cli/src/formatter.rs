//! Output formatters for linking results.

use clap::ValueEnum;
use comfy_table::Table;
use ormbridge::{BridgedModel, LinkOutcome, LocalModel, PendingLink};
use ormbridge_core::{AttachedField, ReverseLink};
use serde_json::json;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// The final state of one configured model.
#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub name: String,
    pub remote_model: String,
    pub status: &'static str,
    pub fields: Vec<AttachedField>,
    pub reverse_links: Vec<ReverseLink>,
    pub fetch_error: Option<String>,
}

impl ModelSummary {
    /// Summarize `model` after every model has been finalized.
    pub fn new(model: &BridgedModel, outcome: &LinkOutcome) -> Self {
        let fetch_error = outcome.report().and_then(|r| r.fetch_error.clone());
        let status = match outcome {
            LinkOutcome::Ignored => "ignored",
            LinkOutcome::Degraded => "degraded",
            LinkOutcome::Linked(_) if fetch_error.is_some() => "fetch failed",
            LinkOutcome::Linked(_) => "linked",
        };

        Self {
            name: model.name().to_string(),
            remote_model: model.remote_id().to_string(),
            status,
            fields: model.fields(),
            reverse_links: model.reverse_links(),
            fetch_error,
        }
    }
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format the linked models and any links left unresolved.
    fn format_report(&self, models: &[ModelSummary], pending: &[PendingLink]) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_report(&self, models: &[ModelSummary], pending: &[PendingLink]) -> String {
        let mut sections = Vec::new();

        for model in models {
            let mut section = format!("{} ({}) - {}", model.name, model.remote_model, model.status);
            if let Some(error) = &model.fetch_error {
                section.push_str(&format!("\n  {}", error));
            }
            if !model.fields.is_empty() {
                section.push('\n');
                section.push_str(&fields_table(&model.fields).to_string());
            }
            if !model.reverse_links.is_empty() {
                section.push_str("\nReferenced by:\n");
                section.push_str(&reverse_links_table(&model.reverse_links).to_string());
            }
            sections.push(section);
        }

        if models.is_empty() {
            sections.push("No models".to_string());
        }

        if !pending.is_empty() {
            let mut table = Table::new();
            table.set_header(vec!["Model", "Field", "Missing target"]);
            for link in pending {
                table.add_row(vec![
                    link.origin.clone(),
                    link.descriptor.name.clone(),
                    pending_target(link),
                ]);
            }
            sections.push(format!("Unresolved links:\n{}", table));
        }

        sections.join("\n\n")
    }
}

fn fields_table(fields: &[AttachedField]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Type", "Required", "Label"]);

    for field in fields {
        table.add_row(vec![
            field.name.clone(),
            field.spec.field_type.type_name(),
            if field.spec.required { "yes" } else { "no" }.to_string(),
            field.spec.label.clone().unwrap_or_default(),
        ]);
    }

    table
}

fn reverse_links_table(links: &[ReverseLink]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Model", "Field", "Kind"]);

    for link in links {
        table.add_row(vec![
            link.from_model.clone(),
            link.field.clone(),
            link.kind.to_string(),
        ]);
    }

    table
}

fn pending_target(link: &PendingLink) -> String {
    link.descriptor
        .relation()
        .map(|r| r.target.to_string())
        .unwrap_or_default()
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_report(&self, models: &[ModelSummary], pending: &[PendingLink]) -> String {
        let models: Vec<serde_json::Value> = models
            .iter()
            .map(|m| {
                json!({
                    "name": m.name,
                    "remote_model": m.remote_model,
                    "status": m.status,
                    "fetch_error": m.fetch_error,
                    "fields": m.fields,
                    "reverse_links": m.reverse_links,
                })
            })
            .collect();

        let pending: Vec<serde_json::Value> = pending
            .iter()
            .map(|link| {
                json!({
                    "model": link.origin,
                    "field": link.descriptor.name,
                    "target": pending_target(link),
                })
            })
            .collect();

        let output = json!({ "models": models, "unresolved": pending });
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
    }
}
