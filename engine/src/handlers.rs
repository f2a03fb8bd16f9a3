//! Command handlers for CLI operations
//!
//! Each handler works against a [`Session`] and prints either human-readable
//! text or pretty JSON.

use anyhow::{Context, Result};
use serde_json::json;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::conductor::{Interaction, RequestContext, Session, StepStatus};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Answer one query
pub async fn handle_ask(
    session: &Session,
    query: &str,
    mode: Option<String>,
    file: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let file_context = match file {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };

    let context = RequestContext { mode, file_context };
    let result = session.process_query(query, context).await;

    match format {
        OutputFormat::Text => {
            for record in &result.execution_results {
                if record.status == StepStatus::Error {
                    eprintln!(
                        "step {} ({}) failed: {}",
                        record.index,
                        record.action,
                        record.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
            println!("{}", result.response);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn print_interactions(interactions: &[&Interaction]) {
    for interaction in interactions {
        println!(
            "[{}] {}: {}",
            interaction.timestamp,
            interaction.role.as_str(),
            interaction.content
        );
    }
}

/// Show the most recent interactions
pub fn handle_history(session: &Session, limit: usize, format: OutputFormat) -> Result<()> {
    let memory = session.memory();
    let history = memory.history(Some(limit));

    match format {
        OutputFormat::Text => {
            if history.is_empty() {
                println!("No conversation history");
                return Ok(());
            }
            print_interactions(&history.iter().collect::<Vec<_>>());
        }
        OutputFormat::Json => {
            let output = json!({
                "history": history,
                "count": history.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

pub fn handle_clear(session: &Session, format: OutputFormat) -> Result<()> {
    session.memory().clear();

    match format {
        OutputFormat::Text => println!("Memory cleared"),
        OutputFormat::Json => {
            println!(
                "{}",
                json!({ "status": "success", "message": "Memory cleared" })
            );
        }
    }

    Ok(())
}

pub fn handle_stats(session: &Session, format: OutputFormat) -> Result<()> {
    let stats = session.memory().stats();

    match format {
        OutputFormat::Text => {
            println!("Interactions: {}", stats.total_interactions);
            if let Some(first) = &stats.first_interaction {
                println!("  First: {}", first);
            }
            if let Some(last) = &stats.last_interaction {
                println!("  Last:  {}", last);
            }
            for (role, count) in &stats.role_distribution {
                println!("  {}: {}", role, count);
            }
            if !stats.context_keys.is_empty() {
                println!("Context keys: {}", stats.context_keys.join(", "));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }

    Ok(())
}

pub fn handle_search(
    session: &Session,
    text: &str,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let memory = session.memory();
    let hits = memory.search(text, limit);

    match format {
        OutputFormat::Text => {
            if hits.is_empty() {
                println!("No interactions match '{}'", text);
            } else {
                print_interactions(&hits);
            }
        }
        OutputFormat::Json => {
            let output = json!({ "results": hits, "count": hits.len() });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

pub fn handle_export(session: &Session, path: &Path, format: OutputFormat) -> Result<()> {
    session
        .memory()
        .export(path)
        .with_context(|| format!("Failed to export memory to {}", path.display()))?;

    match format {
        OutputFormat::Text => println!("Memory exported to {}", path.display()),
        OutputFormat::Json => println!("{}", json!({ "status": "success", "path": path })),
    }

    Ok(())
}

pub fn handle_import(session: &Session, path: &Path, format: OutputFormat) -> Result<()> {
    let mut memory = session.memory();
    memory
        .import(path)
        .with_context(|| format!("Failed to import memory from {}", path.display()))?;

    match format {
        OutputFormat::Text => println!(
            "Imported {} interactions from {}",
            memory.len(),
            path.display()
        ),
        OutputFormat::Json => println!(
            "{}",
            json!({ "status": "success", "interactions": memory.len() })
        ),
    }

    Ok(())
}

pub fn handle_learn(
    session: &Session,
    source: &str,
    content: &str,
    format: OutputFormat,
) -> Result<()> {
    session.knowledge().learn(source, content);

    match format {
        OutputFormat::Text => println!("Learned about {}", source),
        OutputFormat::Json => println!(
            "{}",
            json!({ "status": "success", "message": format!("Learned about {}", source) })
        ),
    }

    Ok(())
}

/// List the knowledge base, or the entries matching `query`
pub fn handle_kb(session: &Session, query: Option<&str>, format: OutputFormat) -> Result<()> {
    let knowledge = session.knowledge();

    match (query, format) {
        (Some(q), OutputFormat::Text) => {
            let hits = knowledge.search(q);
            if hits.is_empty() {
                println!("Nothing known about '{}'", q);
            }
            for hit in hits {
                println!("{}:\n  {}", hit.source, hit.content);
            }
        }
        (Some(q), OutputFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(&knowledge.search(q))?);
        }
        (None, OutputFormat::Text) => {
            if knowledge.is_empty() {
                println!("Knowledge base is empty");
            }
            for (source, entry) in knowledge.all() {
                println!("{} ({}):\n  {}", source, entry.learned_at, entry.content);
            }
        }
        (None, OutputFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(knowledge.all())?);
        }
    }

    Ok(())
}

/// Run the HTTP API until interrupted
pub async fn handle_serve(
    session: Arc<Session>,
    config: &Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.api.host.clone());
    let port = port.unwrap_or(config.api.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    crate::api::serve(session, addr).await?;
    Ok(())
}
