use std::collections::HashMap;
use std::sync::Arc;

use ca_agents::catalog::builtin_agents;
use ca_agents::{AgentRegistry, AgentResolver, MatchKind, MemoryEnablementStore};

fn setup() -> (Arc<AgentRegistry>, AgentResolver) {
    let registry = Arc::new(
        AgentRegistry::new(builtin_agents(), Arc::new(MemoryEnablementStore::new())).unwrap(),
    );
    let resolver = AgentResolver::new(registry.clone(), &HashMap::new()).unwrap();
    (registry, resolver)
}

#[test]
fn murder_case_seeds_case_id() {
    let (_, resolver) = setup();
    let res = resolver.resolve("murder", Some("murder-case-1")).unwrap();
    assert_eq!(res.agent_id, "murder");
    assert_eq!(res.seed_context.get_str("caseId").as_deref(), Some("murder-case-1"));
    assert_eq!(res.seed_context.get_str("caseTitle").as_deref(), Some("Murder Investigation"));
    assert_eq!(res.seed_context.get_str("casePriority").as_deref(), Some("high"));
    assert_eq!(res.seed_context.get_str("caseStatus").as_deref(), Some("open"));
    assert_eq!(
        res.seed_context.get_str("weaponUsed").as_deref(),
        Some("Unknown - Pending forensic analysis")
    );
}

#[test]
fn resolution_is_deterministic() {
    let (_, resolver) = setup();
    for class in ["murder", "theft", "Robbery", "finance", "smuggling", "theft-vehicle"] {
        let first = resolver.resolve(class, Some("c-9")).unwrap();
        for _ in 0..5 {
            assert_eq!(resolver.resolve(class, Some("c-9")).unwrap(), first, "{class}");
        }
    }
}

#[test]
fn unknown_classifications_never_raise() {
    let (_, resolver) = setup();
    for class in ["arson", "jaywalking", "???", "42", "cyber/phishing"] {
        let res = resolver.resolve(class, None).unwrap();
        assert_eq!(res.agent_id, "general", "{class}");
        assert_eq!(res.matched, MatchKind::Default);
    }
}

#[test]
fn no_case_id_means_no_case_id_key() {
    let (_, resolver) = setup();
    let res = resolver.resolve("theft", None).unwrap();
    assert!(res.seed_context.get("caseId").is_none());
    assert_eq!(res.seed_context.get_str("casePriority").as_deref(), Some("medium"));
}

#[test]
fn disabled_agent_walks_up_then_general() {
    let (registry, resolver) = setup();

    registry.set_enabled("murder-chief", false).unwrap();
    assert_eq!(resolver.resolve("murder-chief", None).unwrap().agent_id, "murder");

    registry.set_enabled("murder", false).unwrap();
    assert_eq!(resolver.resolve("murder-chief", None).unwrap().agent_id, "general");
    assert_eq!(resolver.resolve("homicide", None).unwrap().agent_id, "general");

    registry.set_enabled("murder", true).unwrap();
    assert_eq!(resolver.resolve("homicide", None).unwrap().agent_id, "murder");
}

#[test]
fn disabled_general_is_still_the_last_resort() {
    let (registry, resolver) = setup();
    registry.set_enabled("general", false).unwrap();
    assert_eq!(resolver.resolve("arson", None).unwrap().agent_id, "general");
}

#[test]
fn case_assignment_is_remembered() {
    let (_, resolver) = setup();
    assert_eq!(resolver.agent_for_case("FIN-77"), "general");
    resolver.resolve("embezzlement", Some("FIN-77")).unwrap();
    assert_eq!(resolver.agent_for_case("FIN-77"), "finance");
}
