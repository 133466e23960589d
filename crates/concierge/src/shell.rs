// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `concierge shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline
//! history. Queries flow through the full router pipeline: pre-scan,
//! classification, dispatch, post-scan, history.

use std::sync::Arc;

use async_trait::async_trait;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;

use concierge_airs::AirsScanner;
use concierge_config::model::ConciergeConfig;
use concierge_core::{
    ConciergeError, EventFilter, EventRecord, EventStore, ImageGenerator, Intent, Recommender,
    Retriever, WeatherHandler, WeatherReport,
};
use concierge_openai::OpenAiClient;
use concierge_router::{Collaborators, QueryRouter, RouterOptions};

/// Placeholder for a collaborator backend that is not wired up in this
/// build. The router converts the error into user-visible text, so an
/// unconfigured backend degrades per-intent instead of failing startup.
struct Unconfigured(&'static str);

impl Unconfigured {
    fn error(&self) -> ConciergeError {
        ConciergeError::handler(format!("no {} backend configured", self.0))
    }
}

#[async_trait]
impl WeatherHandler for Unconfigured {
    async fn weather(&self, _location: &str, _date: &str) -> Result<WeatherReport, ConciergeError> {
        Err(self.error())
    }
}

#[async_trait]
impl EventStore for Unconfigured {
    async fn events_on(
        &self,
        _date: &str,
        _filter: EventFilter,
    ) -> Result<Vec<EventRecord>, ConciergeError> {
        Err(self.error())
    }
}

#[async_trait]
impl Recommender for Unconfigured {
    async fn recommend(
        &self,
        _weather: &WeatherReport,
        _events: &[EventRecord],
    ) -> Result<String, ConciergeError> {
        Err(self.error())
    }
}

#[async_trait]
impl Retriever for Unconfigured {
    async fn lookup(&self, _query: &str) -> Result<String, ConciergeError> {
        Err(self.error())
    }
}

#[async_trait]
impl ImageGenerator for Unconfigured {
    async fn generate(&self, _prompt: &str) -> Result<String, ConciergeError> {
        Err(self.error())
    }
}

/// Runs the `concierge shell` interactive REPL.
pub async fn run_shell(config: ConciergeConfig) -> Result<(), ConciergeError> {
    let api_key = config.openai.api_key.as_deref().ok_or_else(|| {
        ConciergeError::Config(
            "OpenAI API key required. Set openai.api_key in concierge.toml or \
             CONCIERGE_OPENAI_API_KEY in the environment."
                .to_string(),
        )
    })?;
    let provider = Arc::new(OpenAiClient::new(api_key, config.openai.model.clone())?);

    let scanner = Arc::new(AirsScanner::new(&config.security)?);

    let options = RouterOptions {
        model: config.openai.model.clone(),
        default_location: config.agent.default_location.clone(),
        max_history: config.agent.max_history,
        classifier_max_tokens: config.openai.classifier_max_tokens,
        fallback_max_tokens: config.openai.fallback_max_tokens,
    };

    let mut router = QueryRouter::new(
        Collaborators {
            provider,
            weather: Arc::new(Unconfigured("weather")),
            events: Arc::new(Unconfigured("event")),
            recommender: Arc::new(Unconfigured("recommendation")),
            retriever: Arc::new(Unconfigured("retrieval")),
            images: Arc::new(Unconfigured("image")),
        },
        options,
    )
    .with_scanner(scanner.clone());

    info!(agent = %config.agent.name, "shell session starting");

    let mut rl = DefaultEditor::new()
        .map_err(|e| ConciergeError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", config.agent.name.bold().green());
    if scanner.is_enabled() {
        println!("{}", "runtime security scanning enabled".dimmed());
    }
    println!(
        "Type {} to exit, {} to clear memory, {} for scan statistics.\n",
        "/quit".yellow(),
        "/clear".yellow(),
        "/stats".yellow()
    );

    let prompt = format!("{}> ", config.agent.name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match trimmed {
                    "/clear" => {
                        router.reset_memory();
                        println!("{}", "conversation memory cleared".dimmed());
                    }
                    "/stats" => {
                        let stats = scanner.statistics();
                        match serde_json::to_string_pretty(&stats) {
                            Ok(rendered) => println!("{rendered}"),
                            Err(e) => eprintln!("failed to render statistics: {e}"),
                        }
                    }
                    query => {
                        let reply = router.handle_query(query, "local").await;
                        print_reply(&reply.intent, &reply.response);
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                return Err(ConciergeError::Internal(format!("readline error: {e}")));
            }
        }
    }

    println!("goodbye");
    Ok(())
}

fn print_reply(intent: &Intent, response: &str) {
    let tag = match intent {
        Intent::SecurityBlocked | Intent::SecurityFiltered => {
            format!("[{intent}]").red().bold()
        }
        Intent::Error => format!("[{intent}]").red(),
        _ => format!("[{intent}]").dimmed(),
    };
    println!("{tag} {response}\n");
}
