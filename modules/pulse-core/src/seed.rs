//! Startup data: the problems the dashboard shows before anyone reports one,
//! and the demo contributor profile.

use pulse_common::{
    ActionItem, Category, Comment, Credibility, Evidence, EvidenceKind, Lifecycle, PolicyInfo,
    Problem, ProblemId, SentimentPoint, Severity, Stakeholder, StakeholderKind, TimelineEntry,
    UserProfile,
};

struct Outline {
    title: &'static str,
    summary: &'static str,
    category: Category,
    location: &'static str,
    severity: Severity,
    lifecycle: Lifecycle,
    impact: f64,
    threshold: Option<f64>,
    timestamp: &'static str,
}

fn outline(o: Outline) -> Problem {
    Problem {
        id: ProblemId::new(),
        title: o.title.to_string(),
        summary: o.summary.to_string(),
        category: o.category,
        location: o.location.to_string(),
        severity: o.severity,
        lifecycle: o.lifecycle,
        credibility: Credibility::Unverified,
        credibility_score: 50.0,
        root_cause: String::new(),
        who_is_affected: String::new(),
        why_it_matters: String::new(),
        impact_score: o.impact,
        trend: Vec::new(),
        affected_population: String::new(),
        upvotes: 0,
        comments: Vec::new(),
        solution_ideas: Vec::new(),
        tags: Vec::new(),
        timestamp: o.timestamp.to_string(),
        stakeholders: Vec::new(),
        evidence: Vec::new(),
        sentiment_shift: Vec::new(),
        threshold_level: o.threshold,
        policy_info: None,
        timeline: Vec::new(),
        action_checklist: Vec::new(),
    }
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

fn event(date: &str, text: &str, status: Lifecycle) -> TimelineEntry {
    TimelineEntry {
        date: date.to_string(),
        event: text.to_string(),
        status,
    }
}

pub fn seed_problems() -> Vec<Problem> {
    let mut river = outline(Outline {
        title: "Microplastics saturating the Delta estuary",
        summary: "Plastic fragments from upstream textile plants are accumulating in the estuary, \
                  collapsing local fish stocks.",
        category: Category::Environmental,
        location: "Mekong Delta, Vietnam",
        severity: Severity::Critical,
        lifecycle: Lifecycle::Escalating,
        impact: 92.0,
        threshold: Some(88.0),
        timestamp: "2025-05-28T09:15:00Z",
    });
    river.credibility = Credibility::Verified;
    river.credibility_score = 91.0;
    river.root_cause = "Untreated textile wastewater discharged upstream".to_string();
    river.who_is_affected = "Fishing families and downstream rice farmers".to_string();
    river.why_it_matters = "The estuary feeds a regional food supply chain".to_string();
    river.trend = vec![35.0, 48.0, 61.0, 77.0, 88.0];
    river.affected_population = "2.1 million".to_string();
    river.upvotes = 1240;
    river.tags = tags(&["water", "pollution", "fisheries"]);
    river.solution_ideas = tags(&["Mandatory filtration at textile outlets", "Community water sampling"]);
    river.stakeholders = vec![
        Stakeholder {
            acknowledged_at: Some("2025-05-30".to_string()),
            response_time: Some("52 hours".to_string()),
            ..Stakeholder::new("Ministry of Natural Resources", StakeholderKind::Government, "Enforce discharge permits")
        },
        Stakeholder::new("Delta Waterkeepers", StakeholderKind::Ngo, "Independent sampling"),
        Stakeholder::new("Dr. Linh Tran", StakeholderKind::Expert, "Marine toxicology"),
    ];
    river.evidence = vec![Evidence {
        id: "ev-river-1".to_string(),
        kind: EvidenceKind::Image,
        url: "https://images.example.org/delta-sample.jpg".to_string(),
        contributor: "delta_watch".to_string(),
        verified: true,
    }];
    river.sentiment_shift = vec![
        SentimentPoint {
            date: "2025-05-01".to_string(),
            trust: 60.0,
            outrage: 30.0,
        },
        SentimentPoint {
            date: "2025-05-28".to_string(),
            trust: 35.0,
            outrage: 78.0,
        },
    ];
    river.policy_info = Some(PolicyInfo {
        exists: true,
        description: "National wastewater discharge standard".to_string(),
        gap: "No monitoring of microplastic content".to_string(),
        violation_score: 74.0,
    });
    river.timeline = vec![
        event("2025-04-12", "First fish die-off reported", Lifecycle::Emerging),
        event("2025-05-20", "Independent lab confirms contamination", Lifecycle::Escalating),
    ];
    river.action_checklist = vec![
        ActionItem {
            task: "Publish sampling results".to_string(),
            completed: true,
            suggested_authority: "Delta Waterkeepers".to_string(),
        },
        ActionItem {
            task: "Audit textile discharge permits".to_string(),
            completed: false,
            suggested_authority: "Ministry of Natural Resources".to_string(),
        },
    ];
    river.comments = vec![Comment {
        id: "c-river-1".to_string(),
        user: "minh_fisher".to_string(),
        content: "Our catch is down by half since March.".to_string(),
        timestamp: "2025-05-29T07:40:00Z".to_string(),
    }];

    let mut clinic = outline(Outline {
        title: "Rural clinics running out of insulin",
        summary: "Supply delays leave diabetic patients rationing doses for weeks at a time.",
        category: Category::Health,
        location: "Northern Province, Kenya",
        severity: Severity::High,
        lifecycle: Lifecycle::Emerging,
        impact: 81.0,
        threshold: Some(72.0),
        timestamp: "2025-06-03",
    });
    clinic.credibility = Credibility::PartiallyVerified;
    clinic.credibility_score = 68.0;
    clinic.root_cause = "Single distributor with unreliable cold chain".to_string();
    clinic.who_is_affected = "Diabetic patients in remote districts".to_string();
    clinic.trend = vec![20.0, 25.0, 40.0, 58.0];
    clinic.affected_population = "48,000".to_string();
    clinic.upvotes = 530;
    clinic.tags = tags(&["medicine", "supply chain"]);
    clinic.stakeholders = vec![
        Stakeholder::new("County Health Department", StakeholderKind::Government, "Procurement"),
        Stakeholder::new("ColdBox", StakeholderKind::Startup, "Solar-powered refrigeration"),
    ];
    clinic.timeline = vec![event("2025-06-03", "Problem Reported via Pulse Node", Lifecycle::Emerging)];

    let mut school = outline(Outline {
        title: "Overcrowded classrooms after school closures",
        summary: "Two merged schools now seat more than sixty pupils per class.",
        category: Category::Education,
        location: "Leeds, United Kingdom",
        severity: Severity::Medium,
        lifecycle: Lifecycle::Stabilizing,
        impact: 55.0,
        threshold: Some(40.0),
        timestamp: "2025-03-14",
    });
    school.root_cause = "Budget-driven consolidation".to_string();
    school.trend = vec![70.0, 62.0, 50.0, 45.0];
    school.upvotes = 210;
    school.solution_ideas = tags(&["Staggered timetables"]);
    school.timeline = vec![
        event("2025-01-09", "Merger announced", Lifecycle::Emerging),
        event("2025-03-14", "Temporary classrooms approved", Lifecycle::Stabilizing),
    ];

    let mut transit = outline(Outline {
        title: "Night bus routes cut in outer districts",
        summary: "Shift workers are walking up to two hours home after the last service was removed.",
        category: Category::Social,
        location: "São Paulo, Brazil",
        severity: Severity::Medium,
        lifecycle: Lifecycle::Emerging,
        impact: 63.0,
        threshold: None,
        timestamp: "2025-04-22T22:10:00-03:00",
    });
    transit.trend = vec![30.0, 34.0, 41.0];
    transit.upvotes = 88;
    transit.tags = tags(&["transport", "labour"]);

    let mut outage = outline(Outline {
        title: "Municipal payment portal leaking receipts",
        summary: "Tax receipts of other residents are visible by editing the URL.",
        category: Category::Technology,
        location: "Global Detection",
        severity: Severity::Low,
        lifecycle: Lifecycle::Resolved,
        impact: 34.0,
        threshold: Some(12.0),
        timestamp: "2025-02-02",
    });
    outage.credibility = Credibility::Verified;
    outage.credibility_score = 95.0;
    outage.trend = vec![60.0, 30.0, 10.0];
    outage.upvotes = 45;
    outage.timeline = vec![
        event("2025-01-20", "Disclosure sent to city IT", Lifecycle::Emerging),
        event("2025-01-27", "Patch deployed", Lifecycle::Stabilizing),
        event("2025-02-02", "Independent retest passed", Lifecycle::Resolved),
    ];

    let mut rent = outline(Outline {
        title: "Market stall rents tripled overnight",
        summary: "A new operator raised fees for street vendors without notice.",
        category: Category::Economy,
        location: "Lagos, Nigeria",
        severity: Severity::High,
        lifecycle: Lifecycle::Escalating,
        impact: 70.0,
        threshold: Some(81.0),
        timestamp: "2025-05-10",
    });
    rent.trend = vec![15.0, 50.0, 76.0];
    rent.upvotes = 302;
    rent.tags = tags(&["livelihoods", "informal economy"]);

    vec![river, clinic, school, transit, outage, rent]
}

pub fn demo_profile() -> UserProfile {
    UserProfile {
        id: "u-demo".to_string(),
        name: "Alex Rivera".to_string(),
        points: 1250,
        badges: tags(&["First Reporter", "Verified Contributor", "Solution Architect"]),
        contributions: 14,
    }
}
