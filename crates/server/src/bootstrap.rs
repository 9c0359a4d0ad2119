//! AppState construction and background-task spawning.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use sha2::{Digest, Sha256};

use ca_agents::catalog::{builtin_agents, merge_definitions};
use ca_agents::{
    AgentRegistry, AgentResolver, EnablementStore, FileEnablementStore, MemoryEnablementStore,
};
use ca_backend::{
    BackendGateway, CachingGateway, FallbackProvider, HttpBackendGateway, OfflineGateway,
};
use ca_domain::config::{BackendConfig, Config, ConfigSeverity};
use ca_reports::{ReportStore, ReportSynthesizer};
use ca_sessions::{SessionManager, SessionStateMachine, SessionStore};

use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        anyhow::bail!("config validation failed with {error_count} error(s)");
    }

    // ── Agents ───────────────────────────────────────────────────────
    let agents = merge_definitions(builtin_agents(), &config.agents.definitions);
    let enablement = build_enablement(&config, &agents)?;
    let registry = Arc::new(
        AgentRegistry::new(agents.clone(), enablement).context("building agent registry")?,
    );
    let resolver = Arc::new(
        AgentResolver::new(registry.clone(), &config.agents.classifications)
            .context("building classification table")?,
    );
    let fallback = Arc::new(FallbackProvider::new(&agents));
    tracing::info!(agents = agents.len(), "agent registry ready");

    // ── Backend gateway ──────────────────────────────────────────────
    let gateway = build_gateway(&config.backend)?;

    // ── Sessions ─────────────────────────────────────────────────────
    let store = SessionStore::new(&config.sessions.state_path).context("opening session store")?;
    let machine = SessionStateMachine::new(
        resolver.clone(),
        gateway.clone(),
        fallback.clone(),
        Duration::from_millis(config.backend.deadline_ms),
    );
    let sessions = Arc::new(SessionManager::new(store, machine, config.sessions.transcripts));

    // ── Reports ──────────────────────────────────────────────────────
    let reports =
        Arc::new(ReportStore::new(&config.sessions.state_path).context("opening report store")?);
    let synthesizer = Arc::new(ReportSynthesizer::new(config.reports.default_author.clone()));

    // ── API token ────────────────────────────────────────────────────
    let api_token_hash = std::env::var(&config.server.api_token_env)
        .ok()
        .filter(|t| !t.is_empty())
        .map(|t| Sha256::digest(t.as_bytes()).to_vec());
    if api_token_hash.is_none() {
        tracing::warn!(
            env = %config.server.api_token_env,
            "no API token set; protected routes are open (dev mode)"
        );
    }

    Ok(AppState {
        config,
        registry,
        resolver,
        fallback,
        gateway,
        sessions,
        synthesizer,
        reports,
        api_token_hash,
        started_at: Instant::now(),
    })
}

fn build_enablement(
    config: &Config,
    agents: &[ca_domain::Agent],
) -> anyhow::Result<Arc<dyn EnablementStore>> {
    let mut defaults: HashMap<String, bool> =
        agents.iter().map(|a| (a.id.clone(), a.enabled)).collect();
    defaults.extend(config.agents.enabled.clone());

    Ok(match &config.agents.enablement_path {
        Some(path) => {
            let store = FileEnablementStore::open(path, defaults)
                .with_context(|| format!("opening enablement file {}", path.display()))?;
            tracing::info!(path = %path.display(), "agent enablement persisted to file");
            Arc::new(store)
        }
        None => Arc::new(MemoryEnablementStore::with_flags(defaults)),
    })
}

/// HTTP gateway (optionally cached), or the offline gateway when the
/// backend is disabled.
pub fn build_gateway(cfg: &BackendConfig) -> anyhow::Result<Arc<dyn BackendGateway>> {
    if !cfg.enabled {
        tracing::warn!("backend disabled; every reply will use fallback content");
        return Ok(Arc::new(OfflineGateway));
    }

    let http: Arc<dyn BackendGateway> =
        Arc::new(HttpBackendGateway::new(cfg).context("creating backend client")?);
    tracing::info!(
        url = %cfg.base_url,
        deadline_ms = cfg.deadline_ms,
        "backend gateway ready"
    );

    if cfg.cache_ttl_secs == 0 {
        return Ok(http);
    }
    Ok(Arc::new(CachingGateway::new(
        http,
        Duration::from_secs(cfg.cache_ttl_secs),
    )))
}

/// Spawn the periodic session flush. Call after [`build_app_state`] when
/// running the HTTP server.
pub fn spawn_background_tasks(state: &AppState) {
    let secs = state.config.sessions.flush_interval_secs;
    if secs == 0 {
        return;
    }

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(secs));
        loop {
            interval.tick().await;
            if let Err(e) = sessions.flush() {
                tracing::warn!(error = %e, "session store flush failed");
            }
        }
    });
}
