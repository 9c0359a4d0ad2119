use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ca_agents::catalog::{builtin_agents, merge_definitions};
use ca_agents::{AgentRegistry, AgentResolver, MemoryEnablementStore};
use ca_domain::config::{Config, ConfigSeverity};

use crate::bootstrap::build_gateway;

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at least
/// one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("caseagent doctor");
    println!("================\n");

    let mut all_passed = true;

    check_config_file(config_path, &mut all_passed);
    check_config_validation(config, &mut all_passed);
    check_agent_catalog(config, &mut all_passed);
    check_backend(config, &mut all_passed).await;
    check_state_dir(config, &mut all_passed);

    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

fn check_config_file(config_path: &str, all_passed: &mut bool) {
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "Config file exists",
        exists,
        if exists {
            config_path.to_owned()
        } else {
            format!("{config_path} not found (using defaults)")
        },
    );
    if !exists {
        *all_passed = false;
    }
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
        return;
    }

    print_check(
        "Config validation",
        error_count == 0,
        format!("{} issue(s) ({error_count} error(s))", issues.len()),
    );
    for issue in &issues {
        println!("      {issue}");
    }
    if error_count > 0 {
        *all_passed = false;
    }
}

/// Builds the registry and classification table exactly as `serve` would.
fn check_agent_catalog(config: &Config, all_passed: &mut bool) {
    let agents = merge_definitions(builtin_agents(), &config.agents.definitions);
    let count = agents.len();
    let flags: HashMap<String, bool> = agents.iter().map(|a| (a.id.clone(), a.enabled)).collect();

    let built = AgentRegistry::new(agents, Arc::new(MemoryEnablementStore::with_flags(flags)))
        .and_then(|registry| AgentResolver::new(Arc::new(registry), &config.agents.classifications));

    match built {
        Ok(_) => print_check("Agent catalog", true, format!("{count} agent(s)")),
        Err(e) => {
            print_check("Agent catalog", false, e.to_string());
            *all_passed = false;
        }
    }
}

async fn check_backend(config: &Config, all_passed: &mut bool) {
    let cfg = &config.backend;
    if !cfg.enabled {
        print_check("Backend reachable", true, "disabled (fallback only)".into());
        return;
    }

    let reachable = match build_gateway(cfg) {
        Ok(gateway) => {
            gateway
                .health(Duration::from_millis(cfg.health_deadline_ms))
                .await
        }
        Err(_) => false,
    };

    print_check(
        "Backend reachable",
        reachable,
        if reachable {
            cfg.base_url.clone()
        } else {
            format!("{} (unreachable, answers will use fallback content)", cfg.base_url)
        },
    );
    if !reachable {
        *all_passed = false;
    }
}

fn check_state_dir(config: &Config, all_passed: &mut bool) {
    let path = &config.sessions.state_path;
    let writable = std::fs::create_dir_all(path).is_ok() && {
        let probe = path.join(".caseagent_doctor_probe");
        let w = std::fs::write(&probe, b"probe").is_ok();
        let _ = std::fs::remove_file(&probe);
        w
    };

    print_check(
        "State directory",
        writable,
        if writable {
            format!("{} (writable)", path.display())
        } else {
            format!("{} (not writable)", path.display())
        },
    );
    if !writable {
        *all_passed = false;
    }
}

// ── Formatting helper ─────────────────────────────────────────────────

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
