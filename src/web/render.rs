//! Server-side HTML for each screen.
//!
//! Rendering is a pure function of the session state and the selected
//! results tab. Every piece of user or AI text goes through [`html_escape`].

use std::time::Duration;

use crate::config::APP_NAME;
use crate::flow::SessionState;
use crate::models::{
    AnalysisReport, CarePlanKind, PatientInput, ResultsTab, UrgencyLevel, DURATION_OPTIONS,
    GENDER_OPTIONS, SEVERITY_OPTIONS,
};

pub const DISCLAIMER: &str = "This tool is for informational purposes only and does not \
constitute medical advice. Consult a healthcare professional for any medical concerns.";

pub const LOADING_MESSAGES: &[&str] = &[
    "Connecting to AI neural network...",
    "Analyzing complex symptom patterns...",
    "Cross-referencing global medical data...",
    "Synthesizing personalized insights...",
    "Compiling your diagnostic report...",
];

/// How long each loading message stays up.
const LOADING_MESSAGE_INTERVAL: Duration = Duration::from_millis(2500);

/// Meta refresh interval of the loading page.
pub const LOADING_REFRESH_SECS: u32 = 2;

const STYLE: &str = r#"
*,*::before,*::after{box-sizing:border-box}
body{margin:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#0f172a;color:#e2e8f0;min-height:100vh}
header.top{padding:20px 24px;border-bottom:1px solid #1e293b}
header.top h1{margin:0;font-size:1.25rem;color:#f8fafc}
main{max-width:960px;margin:0 auto;padding:32px 24px}
.card{background:#1e293b;border:1px solid #334155;border-radius:16px;padding:28px;margin-bottom:24px}
h2{margin:0 0 8px;font-size:1.75rem;color:#f8fafc}
h3{margin:0 0 16px;font-size:1.15rem;color:#f1f5f9}
.muted{color:#94a3b8}
.consent-item{display:flex;gap:12px;align-items:flex-start;padding:16px;border:1px solid #334155;border-radius:10px;margin-bottom:12px;background:#0f172a}
.field{margin-bottom:20px}
.field label.title{display:block;font-weight:600;margin-bottom:8px;color:#cbd5e1}
.required::after{content:" *";color:#f87171}
.choices{display:flex;flex-wrap:wrap;gap:10px}
.choices label{padding:8px 14px;border:1px solid #475569;border-radius:8px;cursor:pointer}
input[type=number],input[type=text],select,textarea{width:100%;padding:10px;border-radius:8px;border:1px solid #475569;background:#0f172a;color:#f1f5f9;font-size:.95rem}
.btn{display:inline-block;padding:14px 24px;border:none;border-radius:10px;font-size:1rem;font-weight:600;cursor:pointer;background:#0ea5e9;color:#fff;text-decoration:none}
.error{background:#450a0a;border:1px solid #b91c1c;color:#fecaca;border-radius:10px;padding:14px;margin-bottom:20px}
.spinner{width:64px;height:64px;border:4px solid #334155;border-top-color:#38bdf8;border-radius:50%;margin:0 auto 24px;animation:spin 1s linear infinite}
@keyframes spin{to{transform:rotate(360deg)}}
.center{text-align:center}
.stats{display:grid;grid-template-columns:repeat(auto-fit,minmax(180px,1fr));gap:16px;margin-bottom:24px}
.stat{background:#0f172a;border:1px solid #334155;border-radius:12px;padding:16px}
.stat .value{font-size:1.5rem;font-weight:700;color:#f8fafc}
.urgency-low .value{color:#4ade80}
.urgency-medium .value{color:#facc15}
.urgency-high .value{color:#fb923c}
.urgency-critical .value{color:#f87171}
nav.tabs{display:flex;gap:8px;border-bottom:1px solid #334155;margin-bottom:24px}
nav.tabs a{padding:10px 16px;color:#94a3b8;text-decoration:none;border-bottom:2px solid transparent}
nav.tabs a.active{color:#38bdf8;border-bottom-color:#38bdf8}
.bar{height:8px;background:#334155;border-radius:4px;overflow:hidden;margin-top:8px}
.bar span{display:block;height:100%;background:#38bdf8}
.item{padding:14px 0;border-bottom:1px solid #334155}
.item:last-child{border-bottom:none}
.row{display:flex;justify-content:space-between;gap:16px}
.care-recommendation{border-left:4px solid #4ade80;padding-left:12px}
.care-caution{border-left:4px solid #facc15;padding-left:12px}
footer{max-width:960px;margin:0 auto;padding:24px;color:#64748b;font-size:.8rem;text-align:center}
"#;

// ═══════════════════════════════════════════════════════════
// Entry point
// ═══════════════════════════════════════════════════════════

/// Render the page for the current state.
pub fn render_state(state: &SessionState, tab: ResultsTab) -> String {
    match state {
        SessionState::Consent => render_consent_page(),
        SessionState::Form { draft, error } => render_form_page(draft, error.as_deref()),
        SessionState::Loading { started_at, .. } => render_loading_page(started_at.elapsed()),
        SessionState::Results { report } => render_results_page(report, tab),
    }
}

/// Escape text for use in element content and quoted attributes.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Progress message for the given wait so far.
pub fn loading_message(elapsed: Duration) -> &'static str {
    let step = elapsed.as_millis() / LOADING_MESSAGE_INTERVAL.as_millis();
    LOADING_MESSAGES[(step % LOADING_MESSAGES.len() as u128) as usize]
}

fn layout(title: &str, body: &str, refresh_secs: Option<u32>) -> String {
    let refresh = refresh_secs
        .map(|secs| format!(r#"<meta http-equiv="refresh" content="{secs}">"#))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{refresh}
<title>{title} | {APP_NAME}</title>
<style>{STYLE}</style>
</head>
<body>
<header class="top"><h1>AI Symptom Checker</h1></header>
<main>
{body}
</main>
<footer><p>{DISCLAIMER}</p></footer>
</body>
</html>"#
    )
}

// ═══════════════════════════════════════════════════════════
// Consent
// ═══════════════════════════════════════════════════════════

const CONSENT_ITEMS: &[(&str, &str, &str)] = &[
    (
        "medical_disclaimer",
        "Medical Disclaimer Agreement",
        "I understand this is not a substitute for professional medical advice and will \
         consult healthcare providers for medical concerns.",
    ),
    (
        "data_privacy",
        "Data Privacy",
        "I consent to my symptom information being sent to a third-party AI service for \
         processing. Nothing is stored by this application.",
    ),
    (
        "age_verification",
        "Age Verification",
        "I confirm that I am 18 years or older, or have parental consent to use this service.",
    ),
];

fn render_consent_page() -> String {
    let items: String = CONSENT_ITEMS
        .iter()
        .map(|(name, title, text)| {
            format!(
                r#"<label class="consent-item"><input type="checkbox" name="{name}" required>
<span><strong>{title}</strong><br><span class="muted">{text}</span></span></label>
"#
            )
        })
        .collect();

    let body = format!(
        r#"<div class="center">
<h2>Welcome to Your AI Health Assistant</h2>
<p class="muted">Check your symptoms and receive a structured analysis with recommendations.</p>
</div>
<form class="card" method="post" action="/consent">
<h3>User Consent &amp; Verification</h3>
{items}<button class="btn" type="submit">Agree &amp; Continue</button>
</form>"#
    );
    layout("Consent", &body, None)
}

// ═══════════════════════════════════════════════════════════
// Form
// ═══════════════════════════════════════════════════════════

fn radio_group(name: &str, options: &[&str], selected: &str) -> String {
    options
        .iter()
        .map(|option| {
            let checked = if *option == selected { " checked" } else { "" };
            let value = html_escape(option);
            format!(
                r#"<label><input type="radio" name="{name}" value="{value}" required{checked}> {value}</label>"#
            )
        })
        .collect()
}

fn select_options(options: &[&str], selected: &str) -> String {
    let mut out = String::from(r#"<option value="">Select duration</option>"#);
    // Keep a submitted value the list does not offer.
    if !selected.is_empty() && !options.contains(&selected) {
        let value = html_escape(selected);
        out.push_str(&format!(r#"<option value="{value}" selected>{value}</option>"#));
    }
    for option in options {
        let attr = if *option == selected { " selected" } else { "" };
        let value = html_escape(option);
        out.push_str(&format!(r#"<option value="{value}"{attr}>{value}</option>"#));
    }
    out
}

fn render_form_page(draft: &PatientInput, error: Option<&str>) -> String {
    let banner = error
        .map(|e| format!(r#"<div class="error" role="alert">{}</div>"#, html_escape(e)))
        .unwrap_or_default();
    let age = html_escape(&draft.age);
    let gender = radio_group("gender", GENDER_OPTIONS, &draft.gender);
    let severity = radio_group("severity", SEVERITY_OPTIONS, &draft.severity);
    let description = html_escape(&draft.description);
    let duration = select_options(DURATION_OPTIONS, &draft.duration);
    let history = html_escape(&draft.history);

    let body = format!(
        r#"<div class="center">
<h2>Describe Your Symptoms</h2>
<p class="muted">The more detail you provide, the more specific the analysis.</p>
</div>
<form class="card" method="post" action="/analyze">
{banner}
<div class="field"><label class="title required" for="age">Age</label>
<input type="number" id="age" name="age" min="0" max="130" placeholder="e.g., 35" value="{age}" required></div>
<div class="field"><label class="title required">Gender</label><div class="choices">{gender}</div></div>
<div class="field"><label class="title required">Symptom Severity</label><div class="choices">{severity}</div></div>
<div class="field"><label class="title required" for="description">Symptoms Description</label>
<textarea id="description" name="description" rows="5" required placeholder="Describe your symptoms in detail... (e.g., headache, fever, cough, when it started, what makes it better or worse)">{description}</textarea></div>
<div class="field"><label class="title required" for="duration">Duration</label>
<select id="duration" name="duration" required>{duration}</select></div>
<div class="field"><label class="title" for="history">Relevant Medical History (Optional)</label>
<input type="text" id="history" name="history" placeholder="Any relevant conditions or medications" value="{history}"></div>
<button class="btn" type="submit">Analyze Symptoms</button>
</form>"#
    );
    layout("Describe Your Symptoms", &body, None)
}

// ═══════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════

fn render_loading_page(elapsed: Duration) -> String {
    let message = loading_message(elapsed);
    let body = format!(
        r#"<div class="card center" aria-busy="true">
<div class="spinner"></div>
<h3>Analyzing Your Symptoms...</h3>
<p class="muted">{message}</p>
</div>"#
    );
    layout("Analyzing", &body, Some(LOADING_REFRESH_SECS))
}

// ═══════════════════════════════════════════════════════════
// Results
// ═══════════════════════════════════════════════════════════

/// Integral values without decimals, others with one.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn bar(value: f64) -> String {
    let width = value.clamp(0.0, 100.0);
    format!(r#"<div class="bar"><span style="width:{width:.0}%"></span></div>"#)
}

fn urgency_class(level: UrgencyLevel) -> &'static str {
    match level {
        UrgencyLevel::Low => "urgency-low",
        UrgencyLevel::Medium => "urgency-medium",
        UrgencyLevel::High => "urgency-high",
        UrgencyLevel::Critical => "urgency-critical",
    }
}

fn render_tabs(active: ResultsTab) -> String {
    let links: String = ResultsTab::ALL
        .iter()
        .map(|tab| {
            let class = if *tab == active { r#" class="active""# } else { "" };
            format!(r#"<a href="/?tab={}"{class}>{}</a>"#, tab.as_str(), tab.label())
        })
        .collect();
    format!(r#"<nav class="tabs" aria-label="Tabs">{links}</nav>"#)
}

fn render_conditions(report: &AnalysisReport) -> String {
    let items: String = report
        .result
        .conditions
        .iter()
        .map(|c| {
            format!(
                r#"<div class="item"><div class="row"><strong>{}</strong><span>{}%</span></div>
<p class="muted">{}</p>{}</div>"#,
                html_escape(&c.name),
                format_number(c.probability),
                html_escape(&c.description),
                bar(c.probability),
            )
        })
        .collect();
    format!("<h3>Condition Analysis</h3>{items}")
}

fn render_analysis(report: &AnalysisReport) -> String {
    let risks: String = report
        .result
        .risk_assessment
        .iter()
        .map(|r| {
            format!(
                r#"<div class="item"><div class="row"><span>{}</span><span>Risk Score: {}</span></div>{}</div>"#,
                html_escape(&r.factor),
                format_number(r.value),
                bar(r.value),
            )
        })
        .collect();
    let symptoms = &report.result.symptom_analysis;
    format!(
        r#"<h3>Risk Assessment</h3>{risks}
<h3 style="margin-top:24px">Symptom Analysis</h3>
<div class="item row"><span class="muted">Symptom Severity</span><span>{}</span></div>
<div class="item row"><span class="muted">Duration Pattern</span><span>{}</span></div>
<div class="item row"><span class="muted">Progression</span><span>{}</span></div>"#,
        html_escape(&symptoms.severity),
        html_escape(&symptoms.duration_pattern),
        html_escape(&symptoms.progression),
    )
}

fn render_care_plan(report: &AnalysisReport) -> String {
    let items: String = report
        .result
        .care_plan
        .iter()
        .map(|item| {
            let class = match item.kind {
                CarePlanKind::Recommendation => "care-recommendation",
                CarePlanKind::Caution => "care-caution",
            };
            format!(
                r#"<div class="item {class}"><strong>{}</strong><p class="muted">{}</p></div>"#,
                html_escape(&item.title),
                html_escape(&item.description),
            )
        })
        .collect();
    format!("<h3>Personalized Care Plan</h3>{items}")
}

fn render_timeline(report: &AnalysisReport) -> String {
    let items: String = report
        .result
        .timeline
        .iter()
        .map(|item| {
            format!(
                r#"<div class="item"><span class="muted">{}</span><br><strong>{}</strong><p class="muted">{}</p></div>"#,
                html_escape(&item.time),
                html_escape(&item.title),
                html_escape(&item.description),
            )
        })
        .collect();
    format!("<h3>Follow-up Timeline</h3>{items}")
}

fn render_results_page(report: &AnalysisReport, tab: ResultsTab) -> String {
    let result = &report.result;
    let generated = report.generated_at.format("%Y-%m-%d %H:%M:%S");
    let urgency = result.urgency_level;
    let urgency_class = urgency_class(urgency);
    let confidence = format_number(result.ai_confidence);
    let analyzed = result.conditions_analyzed;
    let recommendations = result.recommendations;
    let tabs = render_tabs(tab);
    let content = match tab {
        ResultsTab::Conditions => render_conditions(report),
        ResultsTab::Analysis => render_analysis(report),
        ResultsTab::CarePlan => render_care_plan(report),
        ResultsTab::Timeline => render_timeline(report),
    };

    let body = format!(
        r#"<div class="card">
<div class="row"><div><h2>AI Diagnosis Analysis</h2><p class="muted">Generated on {generated}</p></div>
<form method="post" action="/new-analysis"><button class="btn" type="submit">New Analysis</button></form></div>
</div>
<div class="stats">
<div class="stat"><div class="muted">AI Confidence</div><div class="value">{confidence}%</div></div>
<div class="stat"><div class="muted">Conditions Analyzed</div><div class="value">{analyzed}</div></div>
<div class="stat {urgency_class}"><div class="muted">Urgency Level</div><div class="value">{urgency}</div></div>
<div class="stat"><div class="muted">Recommendations</div><div class="value">{recommendations}</div></div>
</div>
<div class="card">
{tabs}
{content}
</div>"#
    );
    layout("Results", &body, None)
}
