//! Engine configuration

use chrono::Duration;
use std::str::FromStr;

/// Default appointment length when none is configured
pub const DEFAULT_APPOINTMENT_MINUTES: i64 = 60;

/// Default length of plain-text previews in inquiry lists
pub const DEFAULT_PREVIEW_CHARS: usize = 80;

/// What happens when someone proposes while another proposal is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProposalPolicy {
    /// Both proposals stand; list views follow the latest one
    #[default]
    Coexist,
    /// A new proposal is refused until the latest one is answered
    SinglePending,
}

impl FromStr for ProposalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coexist" => Ok(ProposalPolicy::Coexist),
            "single_pending" | "single-pending" => Ok(ProposalPolicy::SinglePending),
            other => Err(format!("unknown proposal policy: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Length of an appointment derived from an accepted proposal
    pub appointment_duration: Duration,
    pub proposal_policy: ProposalPolicy,
    /// Maximum characters of text shown in an inquiry preview
    pub preview_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            appointment_duration: Duration::minutes(DEFAULT_APPOINTMENT_MINUTES),
            proposal_policy: ProposalPolicy::default(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let appointment_duration = parse_or(
            &lookup,
            "INQUIRY_DESK_APPOINTMENT_MINUTES",
            |minutes: i64| {
                if minutes > 0 {
                    Duration::try_minutes(minutes)
                } else {
                    None
                }
            },
        )
        .unwrap_or(defaults.appointment_duration);

        let proposal_policy = parse_or(&lookup, "INQUIRY_DESK_PROPOSAL_POLICY", Some)
            .unwrap_or(defaults.proposal_policy);

        let preview_chars = parse_or(&lookup, "INQUIRY_DESK_PREVIEW_CHARS", |n: usize| {
            (n > 0).then_some(n)
        })
        .unwrap_or(defaults.preview_chars);

        Self {
            appointment_duration,
            proposal_policy,
            preview_chars,
        }
    }
}

/// Parse `key` and check it with `accept`; bad values are logged and ignored
fn parse_or<T: FromStr, U>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    accept: impl Fn(T) -> Option<U>,
) -> Option<U> {
    let raw = lookup(key)?;
    let parsed = raw.parse::<T>().ok().and_then(accept);
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "Ignoring invalid configuration value");
    }
    parsed
}
