//! Static per-agent content served when the backend is unavailable.

pub(crate) struct Rule {
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
}

pub(crate) struct AgentTable {
    pub title: &'static str,
    pub description: &'static str,
    pub suggested: &'static [&'static str],
    /// Reply when no keyword rule matches; doubles as the greeting.
    pub intro: &'static str,
    /// Empty for sub-agents, which borrow their parent's rules.
    pub rules: &'static [Rule],
    /// Standard next steps used in degraded analyses.
    pub protocol: &'static [&'static str],
    /// Sentence prefixed to replies, for case-stage personas.
    pub persona: Option<&'static str>,
}

pub(crate) fn table(agent_id: &str) -> Option<&'static AgentTable> {
    let t = match agent_id {
        "general" => &GENERAL,
        "murder" => &MURDER,
        "murder-chief" => &MURDER_CHIEF,
        "murder-cop-2" => &MURDER_COP,
        "murder-case-3" => &MURDER_CASE,
        "theft" => &THEFT,
        "theft-chain-snatching" => &CHAIN_SNATCHING,
        "finance" => &FINANCE,
        "finance-exchange-matching" => &EXCHANGE_MATCHING,
        "accident" => &ACCIDENT,
        "abuse" => &ABUSE,
        "smuggle" => &SMUGGLE,
        _ => return None,
    };
    Some(t)
}

static GENERAL: AgentTable = AgentTable {
    title: "Welcome to the Investigation Assistant",
    description: "Your companion for navigating cases, procedures and resources.",
    suggested: &[
        "What can you help me with?",
        "Tell me about the latest cases",
        "How do I analyze evidence?",
        "What investigation techniques should I use?",
    ],
    intro: "I'm the general investigation assistant. I can help with procedures, case management and pointing you to the right specialist agent. What would you like to know?",
    rules: &[
        Rule {
            keywords: &["about", "what can you do", "system"],
            reply: "I route questions to specialist agents for homicide, theft, financial crime, accidents, abuse and smuggling, guide structured case intake, and produce investigation reports.",
        },
        Rule {
            keywords: &["help", "how to"],
            reply: "Pick the crime type for your case to start a guided intake, or ask a question directly. Reports can be generated once an intake completes.",
        },
        Rule {
            keywords: &["evidence", "proof"],
            reply: "General evidence handling:\n\n• Secure and document the scene before anything is moved\n• Keep an unbroken chain of custody\n• Photograph items in place with scale references\n• Log every transfer with time, handler and purpose",
        },
    ],
    protocol: &[
        "Confirm the crime classification so a specialist agent can take over",
        "Record all known facts with their sources",
        "Identify and preserve evidence at risk of loss",
    ],
    persona: None,
};

static MURDER: AgentTable = AgentTable {
    title: "Homicide Investigation Assistant",
    description: "Expert guidance for murder investigations and forensic analysis.",
    suggested: &[
        "What are the key steps in a homicide investigation?",
        "How is forensic evidence collected at a murder scene?",
        "What techniques are used for suspect profiling?",
        "How are witness testimonies verified?",
    ],
    intro: "I'm the Murder Agent, specialized in homicide investigations and forensic analysis. I can help with forensic priorities, motive assessment, suspect profiling and timeline reconstruction.",
    rules: &[
        Rule {
            keywords: &["forensic", "evidence"],
            reply: "Forensic priorities for a homicide:\n\n• Secure the scene and start the chain of custody immediately\n• Document body position, lividity and rigor before moving\n• Collect trace evidence (hair, fibers, DNA) before removal\n• Photograph blood spatter for reconstruction\n• Preserve digital evidence (phones, computers, surveillance)",
        },
        Rule {
            keywords: &["motive", "why"],
            reply: "Motives to examine:\n\n• Personal conflict: recent arguments and threats\n• Financial gain: wills, insurance, business dealings\n• Domestic history: prior incidents in the relationship\n• Criminal connections of the victim\n• Mistaken identity",
        },
        Rule {
            keywords: &["suspect", "profile", "who"],
            reply: "Suspect profiling:\n\n• Start with the victim's close circle\n• Check beneficiaries of the victim's death\n• Review the victim's last 24 to 48 hours of contacts\n• Read the scene for planning versus impulse",
        },
        Rule {
            keywords: &["timeline", "when"],
            reply: "Timeline reconstruction:\n\n• Estimate time of death from temperature, lividity and stomach contents\n• Trace the victim's last known movements and messages\n• Pull phone records, GPS and surveillance footage\n• Lay out a timeline and look for gaps",
        },
    ],
    protocol: &[
        "Secure the scene and maintain chain of custody for all physical evidence",
        "Interview witnesses and the victim's close contacts",
        "Establish a timeline around the estimated time of death",
        "Request forensic analysis of the weapon and trace evidence",
    ],
    persona: None,
};

static MURDER_CHIEF: AgentTable = AgentTable {
    title: "Chief Investigator",
    description: "Leads the homicide investigation and coordinates the team.",
    suggested: &[
        "What is the status of the investigation?",
        "Which leads should the team prioritise?",
        "What resources do we need?",
    ],
    intro: "As the Chief Investigator I coordinate this homicide case and the team working it.",
    rules: &[],
    protocol: &[
        "Assign scene, canvass and forensics leads",
        "Hold a daily case review and update the lead board",
    ],
    persona: Some("As the Chief Investigator leading this case:"),
};

static MURDER_COP: AgentTable = AgentTable {
    title: "Field Officer",
    description: "Scene work, canvassing and evidence handling.",
    suggested: &[
        "Who has been interviewed so far?",
        "What did the canvass turn up?",
        "Which evidence is still at the lab?",
    ],
    intro: "As the field officer on this case I handle scene work, canvassing and evidence logistics.",
    rules: &[],
    protocol: &[
        "Complete the neighbourhood canvass",
        "Collect surveillance footage before it is overwritten",
    ],
    persona: Some("As the field officer working this case:"),
};

static MURDER_CASE: AgentTable = AgentTable {
    title: "Case Analyst",
    description: "Builds the full case file step by step and analyzes it.",
    suggested: &[
        "Start a new case file",
        "What details do you need from me?",
    ],
    intro: "Hello, I'm the case analyst for homicide investigations. I'll collect the case details step by step and then prepare an analysis.",
    rules: &[],
    protocol: &[
        "Cross-check the victim's timeline against witness statements",
        "Prioritise evidence that links a suspect to the scene",
    ],
    persona: Some("As the analyst assembling this case file:"),
};

static THEFT: AgentTable = AgentTable {
    title: "Theft Investigation Assistant",
    description: "Expert guidance for theft cases and property crime investigations.",
    suggested: &[
        "What are the most common theft patterns?",
        "How do you track stolen goods?",
        "What security measures prevent theft?",
        "How do you identify professional thieves?",
    ],
    intro: "I'm the Theft Agent, specialized in property crime. I can help with theft patterns, evidence collection and tracking stolen goods.",
    rules: &[
        Rule {
            keywords: &["pattern", "trend"],
            reply: "Theft patterns to check:\n\n• Repeat locations and times of day\n• Entry methods shared across incidents\n• Item types targeted together\n• Proximity to transit routes and resale points",
        },
        Rule {
            keywords: &["track", "recover", "stolen"],
            reply: "Tracking stolen property:\n\n• Enter serial numbers in the stolen property database\n• Alert pawn shops and second-hand dealers\n• Monitor online marketplaces for matching listings\n• Check tracking features on electronics",
        },
        Rule {
            keywords: &["evidence", "collect"],
            reply: "Theft evidence:\n\n• Fingerprints and tool marks at entry points\n• Surveillance footage along likely approach routes\n• Receipts and photos establishing ownership and value",
        },
    ],
    protocol: &[
        "Compile an itemised list of stolen property with serial numbers",
        "Canvass for surveillance footage near the scene",
        "Alert resale channels about the stolen items",
    ],
    persona: None,
};

static CHAIN_SNATCHING: AgentTable = AgentTable {
    title: "Chain Snatching Assistant",
    description: "Street snatching hotspots, offender patterns and prevention.",
    suggested: &[
        "Where are the current hotspots?",
        "Who are the typical targets?",
        "How can patrols prevent snatching?",
    ],
    intro: "I'm the Chain Snatching Agent. I can help with hotspots, victim and offender patterns, and prevention strategy.",
    rules: &[
        Rule {
            keywords: &["hotspot", "location", "where"],
            reply: "Snatching hotspots cluster around markets, bus stops and quiet residential lanes, usually in early morning or evening. Map recent incidents to target patrols.",
        },
        Rule {
            keywords: &["offender", "suspect", "criminal"],
            reply: "Offenders usually work in pairs on two-wheelers, one riding and one snatching. Check vehicle descriptions against recent thefts of motorcycles.",
        },
        Rule {
            keywords: &["prevent", "strategy", "stop"],
            reply: "Prevention: visible patrols at peak hours, public awareness at hotspots, and quick-response teams linked to CCTV.",
        },
    ],
    protocol: &[
        "Map the incident against recent snatching reports",
        "Check jewellers and pawn brokers for the stolen chain",
    ],
    persona: None,
};

static FINANCE: AgentTable = AgentTable {
    title: "Financial Fraud Assistant",
    description: "Specialized help for financial crime investigations and fraud detection.",
    suggested: &[
        "What are common financial fraud indicators?",
        "How do you trace money laundering activities?",
        "What financial documents should be analyzed in fraud cases?",
        "How are digital financial crimes investigated?",
    ],
    intro: "I'm the Financial Crimes Agent. I can help with fraud indicators, transaction analysis and money laundering.",
    rules: &[
        Rule {
            keywords: &["launder"],
            reply: "Money laundering indicators:\n\n• Structuring deposits below reporting thresholds\n• Rapid movement of funds through several accounts\n• Transfers to high-risk jurisdictions\n• Business income inconsistent with activity",
        },
        Rule {
            keywords: &["transaction", "pattern"],
            reply: "Transaction analysis:\n\n• Build a flow chart of funds between accounts\n• Flag round amounts and unusual timing\n• Compare against the customer's historical profile",
        },
        Rule {
            keywords: &["insider", "trading", "stock"],
            reply: "Market abuse: correlate trades with the timing of non-public information and check communications between traders and insiders.",
        },
    ],
    protocol: &[
        "Obtain account statements for the relevant period",
        "Trace the flow of funds between accounts",
        "Preserve electronic communications related to the transactions",
    ],
    persona: None,
};

static EXCHANGE_MATCHING: AgentTable = AgentTable {
    title: "Exchange Matching Assistant",
    description: "Matches exchange records against case transactions.",
    suggested: &[
        "Are there mismatches between the ledgers?",
        "Which transfers look suspicious?",
    ],
    intro: "I'm the Exchange Matching Agent. I reconcile exchange records against case transactions and flag discrepancies.",
    rules: &[
        Rule {
            keywords: &["mismatch", "discrepanc"],
            reply: "Discrepancy review: match each transfer by amount, timestamp and counterparty; unmatched items on either side are the starting leads.",
        },
        Rule {
            keywords: &["suspicious", "unusual"],
            reply: "Suspicious exchange activity: rapid in-and-out transfers, many small deposits from unrelated wallets, and withdrawals right after KYC changes.",
        },
    ],
    protocol: &[
        "Request exchange records for the relevant accounts",
        "Reconcile them against bank statements",
    ],
    persona: None,
};

static ACCIDENT: AgentTable = AgentTable {
    title: "Accident Investigation Assistant",
    description: "Accident reconstruction, causes and liability.",
    suggested: &[
        "How do you reconstruct an accident?",
        "What are the common causes?",
        "How is negligence assessed?",
    ],
    intro: "I'm the Accident Agent, specialized in accident reconstruction. I can help with reconstruction, cause analysis, negligence and evidence.",
    rules: &[
        Rule {
            keywords: &["reconstruct", "how"],
            reply: "Reconstruction:\n\n• Document the scene with photos and measurements before it is cleared\n• Record skid marks, debris field and point of impact\n• Pull event data recorders where available\n• Calculate speeds from marks and final positions",
        },
        Rule {
            keywords: &["cause", "why"],
            reply: "Look at driver factors (impairment, distraction, speed), vehicle condition, environment and road design. Most accidents have several contributing factors.",
        },
        Rule {
            keywords: &["negligence", "fault", "liability"],
            reply: "Negligence: establish the duty of care, the breach, causation and the damages. Traffic violations, phone use and maintenance records are common indicators.",
        },
    ],
    protocol: &[
        "Document the scene before vehicles are moved",
        "Collect witness statements and dashcam footage",
        "Request toxicology where impairment is possible",
    ],
    persona: None,
};

static ABUSE: AgentTable = AgentTable {
    title: "Abuse Investigation Assistant",
    description: "Abuse cases with a victim-centered approach.",
    suggested: &[
        "How should the victim be supported?",
        "What are the high-risk indicators?",
        "What evidence should be documented?",
    ],
    intro: "I'm the Abuse Agent, specialized in abuse cases and victim support. I can help with victim-centered approaches, risk assessment and evidence.",
    rules: &[
        Rule {
            keywords: &["victim", "support"],
            reply: "Victim-centered approach: address immediate safety and medical needs, interview in a safe setting with trauma-informed questions, and connect the victim with shelter, medical, legal and financial support.",
        },
        Rule {
            keywords: &["risk", "danger"],
            reply: "High-risk indicators: threats to kill, access to weapons, recent separation, strangulation attempts, stalking and protection order violations. Several together call for immediate safety measures.",
        },
        Rule {
            keywords: &["evidence", "document"],
            reply: "Evidence: injury photographs over several days, medical records, prior calls and reports, threatening messages and witness statements.",
        },
    ],
    protocol: &[
        "Ensure the victim's immediate safety",
        "Refer the victim to support services",
        "Document injuries and prior incidents",
    ],
    persona: None,
};

static SMUGGLE: AgentTable = AgentTable {
    title: "Smuggling Investigation Assistant",
    description: "Specialized help for smuggling and contraband investigations.",
    suggested: &[
        "What are common smuggling routes?",
        "How are smuggled goods detected?",
        "What technologies are used to prevent smuggling?",
        "How do international agencies coordinate on smuggling cases?",
    ],
    intro: "I'm the Smuggling Agent. I can help with routes, concealment methods and inter-agency coordination.",
    rules: &[
        Rule {
            keywords: &["route"],
            reply: "Routes shift with enforcement pressure; compare seizure locations over time and watch for transit through low-inspection ports.",
        },
        Rule {
            keywords: &["detect", "conceal"],
            reply: "Detection relies on manifest anomalies, scanning, detection dogs and risk-profiled inspections of cargo and vehicles.",
        },
    ],
    protocol: &[
        "Trace the shipment's origin and transit points",
        "Coordinate with customs and border agencies",
    ],
    persona: None,
};
