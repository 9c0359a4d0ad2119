//! Built-in agent catalog and classification aliases.
//!
//! Configuration may add agents or replace a built-in by id; see
//! [`merge_definitions`].

use ca_domain::agent::GENERAL_AGENT;
use ca_domain::{Agent, AnswerFormat, CasePriority, FieldMap, IntakeStep};

fn seed(pairs: &[(&str, &str)]) -> FieldMap {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn murder_seed() -> FieldMap {
    seed(&[
        ("location", "Unknown - Will be provided during investigation"),
        ("victimName", "Unknown - Pending identification"),
        ("victimAge", "Unknown"),
        ("victimGender", "Unknown"),
        ("causeOfDeath", "Under investigation"),
        ("weaponUsed", "Unknown - Pending forensic analysis"),
        ("crimeSceneDescription", "Crime scene under investigation"),
        ("witnesses", "None identified yet"),
        ("evidence", "Evidence collection in progress"),
        ("suspects", "No suspects identified yet"),
    ])
}

/// Full homicide intake used by the case-stage sub-agent.
fn homicide_intake() -> Vec<IntakeStep> {
    use AnswerFormat::*;
    vec![
        IntakeStep::with_format(
            "dateOfCrime",
            "When did the crime occur? Please provide the date (YYYY-MM-DD, MM/DD/YYYY, or text format like 'January 15, 2023').",
            Date,
        ),
        IntakeStep::with_format(
            "timeOfCrime",
            "What time did the crime occur? (HH:MM format, or approximate time like '2:30 PM', 'noon', or 'evening')",
            Time,
        ),
        IntakeStep::text("location", "Where did the crime take place? Please provide the location."),
        IntakeStep::text("victimName", "What is the victim's name?"),
        IntakeStep::with_format("victimAge", "What is the victim's age?", Age),
        IntakeStep::text("victimGender", "What is the victim's gender?"),
        IntakeStep::text("causeOfDeath", "What was the cause of death?"),
        IntakeStep::text("weaponUsed", "Was a weapon used? If so, what kind?"),
        IntakeStep::text("crimeSceneDescription", "Please describe the crime scene."),
        IntakeStep::text("witnesses", "Were there any witnesses? If so, please provide details."),
        IntakeStep::text("evidenceFound", "What evidence was found at the scene?"),
        IntakeStep::text("suspects", "Are there any suspects at this time?"),
        IntakeStep::text(
            "additionalNotes",
            "Do you have any additional notes or information about the case?",
        ),
    ]
}

/// Agents shipped with the binary, parents before children.
pub fn builtin_agents() -> Vec<Agent> {
    vec![
        Agent::new(GENERAL_AGENT, "General Assistant")
            .describe("Answers general questions about procedures, resources and case management.")
            .with_capabilities(["general", "procedures"]),
        Agent::new("murder", "Murder Investigation Agent")
            .describe("Homicide investigation: cause of death, timeline, weapon and suspects.")
            .with_capabilities(["homicide", "forensics"])
            .with_priority(CasePriority::High)
            .with_intake(vec![
                IntakeStep::text("causeOfDeath", "What was the cause of death?"),
                IntakeStep::text(
                    "crimeTime",
                    "When did the crime occur? Please give the date and time as precisely as you can.",
                ),
                IntakeStep::text("weaponUsed", "Was a weapon used? If so, what kind?"),
            ])
            .with_seed(murder_seed()),
        Agent::new("murder-chief", "Chief Investigator")
            .describe("Oversees the homicide investigation and coordinates the team.")
            .child_of("murder")
            .with_capabilities(["homicide", "coordination"])
            .with_priority(CasePriority::High)
            .with_seed(murder_seed()),
        Agent::new("murder-cop-2", "Field Officer")
            .describe("Scene work, witness canvassing and evidence handling.")
            .child_of("murder")
            .with_capabilities(["homicide", "field-work"])
            .with_priority(CasePriority::High)
            .with_seed(murder_seed()),
        Agent::new("murder-case-3", "Case Analyst")
            .describe("Collects the full case file step by step and produces an analysis.")
            .child_of("murder")
            .with_capabilities(["homicide", "analysis"])
            .with_priority(CasePriority::High)
            .with_intake(homicide_intake())
            .with_seed(murder_seed()),
        Agent::new("theft", "Theft Investigation Agent")
            .describe("Burglary, robbery and property theft.")
            .with_capabilities(["property-crime"])
            .with_intake(vec![
                IntakeStep::with_format("dateOfTheft", "When did the theft happen?", AnswerFormat::Date),
                IntakeStep::text("location", "Where did the theft take place?"),
                IntakeStep::text("stolenItems", "What was stolen?"),
                IntakeStep::text("estimatedValue", "What is the estimated value of the stolen property?"),
                IntakeStep::text("theftMethod", "How was the theft carried out?"),
            ])
            .with_seed(seed(&[
                ("location", "Unknown - Will be provided during investigation"),
                ("victimName", "Unknown - Pending identification"),
                ("stolenItems", "Unknown - Pending inventory"),
                ("estimatedValue", "Unknown - Pending assessment"),
                ("theftMethod", "Unknown - Under investigation"),
            ])),
        Agent::new("theft-chain-snatching", "Chain Snatching Agent")
            .describe("Street snatching: hotspots, vehicle descriptions and pawn-shop leads.")
            .child_of("theft")
            .with_capabilities(["property-crime", "street-crime"]),
        Agent::new("finance", "Financial Crimes Agent")
            .describe("Fraud, embezzlement and suspicious transactions.")
            .with_capabilities(["fraud"])
            .with_intake(vec![
                IntakeStep::text("fraudType", "What type of fraud is suspected?"),
                IntakeStep::text("fraudAmount", "What amount is involved?"),
                IntakeStep::text("financialInstitution", "Which financial institution is involved?"),
                IntakeStep::text("transactionDetails", "Describe the suspicious transactions."),
            ])
            .with_seed(seed(&[
                ("victimName", "Unknown - Pending identification"),
                ("fraudType", "Unknown - Under investigation"),
                ("fraudAmount", "Unknown - Pending assessment"),
                ("financialInstitution", "Unknown - Pending information"),
                ("transactionDetails", "Unknown - Pending analysis"),
            ])),
        Agent::new("finance-exchange-matching", "Exchange Matching Agent")
            .describe("Matches currency and crypto exchange records against case transactions.")
            .child_of("finance")
            .with_capabilities(["fraud", "transactions"]),
        Agent::new("accident", "Accident Investigation Agent")
            .describe("Traffic and workplace accidents, reconstruction and liability.")
            .with_capabilities(["accident"]),
        Agent::new("abuse", "Abuse Investigation Agent")
            .describe("Domestic and child abuse cases, victim safety and referrals.")
            .with_capabilities(["victim-support"])
            .with_priority(CasePriority::High),
        Agent::new("smuggle", "Smuggling Investigation Agent")
            .describe("Contraband routes, concealment methods and trafficking networks.")
            .with_capabilities(["organized-crime"]),
    ]
}

/// Classification aliases that do not match an agent id directly.
pub fn builtin_classifications() -> Vec<(&'static str, &'static str)> {
    vec![
        ("homicide", "murder"),
        ("manslaughter", "murder"),
        ("burglary", "theft"),
        ("robbery", "theft"),
        ("chain-snatching", "theft-chain-snatching"),
        ("fraud", "finance"),
        ("financial-fraud", "finance"),
        ("embezzlement", "finance"),
        ("exchange-matching", "finance-exchange-matching"),
        ("crime-accident", "accident"),
        ("crime-abuse", "abuse"),
        ("domestic-violence", "abuse"),
        ("smuggling", "smuggle"),
        ("trafficking", "smuggle"),
    ]
}

/// Overlay configured definitions onto the built-ins: same id replaces in
/// place, new ids are appended in configuration order.
pub fn merge_definitions(mut base: Vec<Agent>, overrides: &[Agent]) -> Vec<Agent> {
    for def in overrides {
        match base.iter_mut().find(|a| a.id == def.id) {
            Some(slot) => *slot = def.clone(),
            None => base.push(def.clone()),
        }
    }
    base
}
