//! Template rendering.
//!
//! Turns raw template content into a finished postmortem by substituting the
//! `!ib-inject-*` placeholder tokens with incident data. Free-text fields are
//! inserted verbatim; templates rely on that, so nothing is HTML-escaped.

use chrono::NaiveDateTime;

use crate::models::{IncidentEvent, IncidentParticipant, IncidentRecord};

pub const DESCRIPTION_TOKEN: &str = "!ib-inject-description";
pub const DURATION_TOKEN: &str = "!ib-inject-duration";
pub const IMPACT_TOKEN: &str = "!ib-inject-impact";
pub const COMPONENTS_TOKEN: &str = "!ib-inject-components";
pub const CHANNEL_TOKEN: &str = "!ib-inject-channel";
pub const SEVERITY_TOKEN: &str = "!ib-inject-severity";
pub const CREATED_AT_TOKEN: &str = "!ib-inject-created-at";
pub const UPDATED_AT_TOKEN: &str = "!ib-inject-updated-at";
pub const PARTICIPANTS_TOKEN: &str = "!ib-inject-participants";
pub const TIMELINE_TOKEN: &str = "!ib-inject-timeline";

/// Every token the renderer knows about
pub const ALL_TOKENS: [&str; 10] = [
    DESCRIPTION_TOKEN,
    DURATION_TOKEN,
    IMPACT_TOKEN,
    COMPONENTS_TOKEN,
    CHANNEL_TOKEN,
    SEVERITY_TOKEN,
    CREATED_AT_TOKEN,
    UPDATED_AT_TOKEN,
    PARTICIPANTS_TOKEN,
    TIMELINE_TOKEN,
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SECONDS_PER_DAY: i64 = 86_400;

/// Incident facts needed to instantiate one postmortem
#[derive(Debug, Clone, Copy)]
pub struct PostmortemContext<'a> {
    pub incident: &'a IncidentRecord,
    pub participants: &'a [IncidentParticipant],
    pub timeline: &'a [IncidentEvent],
    /// Slack workspace subdomain used for the channel link
    pub workspace_id: &'a str,
}

impl<'a> PostmortemContext<'a> {
    pub fn channel_url(&self) -> String {
        format!(
            "https://{}.slack.com/archives/{}",
            self.workspace_id, self.incident.channel_id
        )
    }
}

/// Token → value pairs for a single render pass
#[derive(Debug, Clone)]
pub struct PlaceholderMap {
    entries: Vec<(&'static str, String)>,
}

impl PlaceholderMap {
    pub fn build(ctx: &PostmortemContext<'_>) -> Self {
        let incident = ctx.incident;
        let entries = vec![
            (
                DESCRIPTION_TOKEN,
                incident.description.clone().unwrap_or_default(),
            ),
            (
                DURATION_TOKEN,
                format_duration(incident.created_at, incident.updated_at),
            ),
            (IMPACT_TOKEN, incident.impact.clone().unwrap_or_default()),
            (COMPONENTS_TOKEN, incident.components.join(", ")),
            (CHANNEL_TOKEN, ctx.channel_url()),
            (SEVERITY_TOKEN, incident.severity.clone().unwrap_or_default()),
            (CREATED_AT_TOKEN, format_timestamp(incident.created_at)),
            (UPDATED_AT_TOKEN, format_timestamp(incident.updated_at)),
            (PARTICIPANTS_TOKEN, participants_table(ctx.participants)),
            (TIMELINE_TOKEN, timeline_table(ctx.timeline)),
        ];

        Self { entries }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every occurrence of every token in `template`
    pub fn apply(self, template: &str) -> String {
        self.entries
            .into_iter()
            .fold(template.to_string(), |content, (token, value)| {
                content.replace(token, &value)
            })
    }
}

/// Render a template for the given incident
pub fn render_template(template: &str, ctx: &PostmortemContext<'_>) -> String {
    PlaceholderMap::build(ctx).apply(template)
}

/// Human-readable incident duration.
///
/// Days are floored so a negative delta behaves like `timedelta` arithmetic:
/// the day count goes negative and the remainder stays positive.
pub fn format_duration(
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
) -> String {
    let (Some(created_at), Some(updated_at)) = (created_at, updated_at) else {
        return "Unknown".to_string();
    };

    let total_seconds = (updated_at - created_at).num_milliseconds().div_euclid(1000);
    let days = total_seconds.div_euclid(SECONDS_PER_DAY);
    let remainder = total_seconds.rem_euclid(SECONDS_PER_DAY);
    let hours = remainder / 3600;
    let minutes = (remainder % 3600) / 60;
    let seconds = remainder % 60;

    if days > 0 {
        format!("{} days, {} hours, {} minutes", days, hours, minutes)
    } else if hours > 0 {
        format!("{} hours, {} minutes", hours, minutes)
    } else {
        format!("{} minutes, {} seconds", minutes, seconds)
    }
}

/// `YYYY-MM-DD HH:MM:SS`, or empty when absent
pub fn format_timestamp(value: Option<NaiveDateTime>) -> String {
    value
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// `incident_commander` → `Incident Commander`
pub fn normalize_role(role: &str) -> String {
    let mut normalized = String::with_capacity(role.len());
    let mut in_word = false;

    for ch in role.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if in_word {
                normalized.extend(ch.to_lowercase());
            } else {
                normalized.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            normalized.push(ch);
            in_word = false;
        }
    }

    normalized
}

pub fn participants_table(participants: &[IncidentParticipant]) -> String {
    let mut html =
        String::from("<table><thead><tr><th>Role</th><th>User</th></tr></thead><tbody>");

    for participant in participants {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            normalize_role(&participant.role),
            participant.user_name
        ));
    }

    html.push_str("</tbody></table>");
    html
}

pub fn timeline_table(timeline: &[IncidentEvent]) -> String {
    let mut html =
        String::from("<table><thead><tr><th>Timestamp</th><th>Event</th></tr></thead><tbody>");

    for event in timeline {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            format_timestamp(event.created_at),
            event.text
        ));
    }

    html.push_str("</tbody></table>");
    html
}
