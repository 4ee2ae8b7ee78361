//! Inquiry Desk demo
//!
//! Seeds the demo inbox and prints what the configured party sees.

use inquiry_desk::fixtures::{self, PROFESSIONAL_NAME, PROPOSAL_INDEX, PROPOSAL_INQUIRY};
use inquiry_desk::{EngineConfig, InquiryStats, Negotiator, PriceInfo, Role, Session};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let pretty = std::env::var("INQUIRY_DESK_LOG_FORMAT").is_ok_and(|f| f == "pretty");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inquiry_desk=info".into()),
        )
        .with(pretty.then(|| tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr)))
        .with((!pretty).then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr)
        }))
        .init();

    // Configuration
    let config = EngineConfig::from_env();
    let role: Role = std::env::var("INQUIRY_DESK_ROLE")
        .ok()
        .map(|r| r.parse::<Role>())
        .transpose()?
        .unwrap_or(Role::Professional);
    let name = std::env::var("INQUIRY_DESK_NAME").unwrap_or_else(|_| match role {
        Role::Professional => PROFESSIONAL_NAME.to_string(),
        Role::Customer => "john_s".to_string(),
    });
    let session = Session::new(role, name);

    tracing::info!(
        role = %session.role,
        name = %session.display_name,
        policy = ?config.proposal_policy,
        appointment_minutes = config.appointment_duration.num_minutes(),
        "Starting inquiry desk"
    );

    let engine = Negotiator::new(config);
    fixtures::seed_demo_inbox(engine.store())?;

    if std::env::var("INQUIRY_DESK_REPLAY").is_ok_and(|v| v == "1" || v == "true") {
        engine.accept_proposal(
            PROPOSAL_INQUIRY,
            PROPOSAL_INDEX,
            &Session::professional(PROFESSIONAL_NAME),
            PriceInfo::range(150, 250),
        )?;
    }

    let summaries = engine.summaries(&session);
    let report = json!({
        "session": session,
        "stats": InquiryStats::from_summaries(&summaries),
        "inquiries": summaries,
        "appointments": engine.appointments(&session),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
