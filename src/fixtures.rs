//! Demo inbox
//!
//! A handful of plumbing inquiries between four customers and one
//! professional, used by the binary and by tests.

use crate::error::EngineResult;
use crate::schedule::parse_instant;
use crate::session::Session;
use crate::thread::{FormField, Message, ThreadStore};

pub const PROFESSIONAL_NAME: &str = "Pro Plumbers Inc.";

const ISSUE: &str = "What is the issue?";
const DETAIL: &str = "Describe the issue in detail";
const CONTACT: &str = "Preferred contact method";
const URGENCY: &str = "When do you need service?";

/// Inquiry that ends with a pending customer proposal
pub const PROPOSAL_INQUIRY: &str = "101";
/// Index of that proposal within its thread
pub const PROPOSAL_INDEX: usize = 3;

enum Seed {
    Form([&'static str; 4]),
    Text(&'static str),
    Proposal(&'static str),
}

struct SeedMessage {
    from_customer: bool,
    sent_at: &'static str,
    seed: Seed,
}

const fn customer(sent_at: &'static str, seed: Seed) -> SeedMessage {
    SeedMessage {
        from_customer: true,
        sent_at,
        seed,
    }
}

const fn pro(sent_at: &'static str, seed: Seed) -> SeedMessage {
    SeedMessage {
        from_customer: false,
        sent_at,
        seed,
    }
}

struct SeedThread {
    inquiry_id: &'static str,
    customer: &'static str,
    address: Option<&'static str>,
    messages: &'static [SeedMessage],
}

const INBOX: &[SeedThread] = &[
    SeedThread {
        inquiry_id: "101",
        customer: "john_s",
        address: None,
        messages: &[
            customer(
                "2025-10-01T09:30",
                Seed::Form([
                    "Leaky Faucet",
                    "My kitchen sink has been dripping for the past week. It's getting worse and wasting a lot of water.",
                    "Phone",
                    "Within 24 hours",
                ]),
            ),
            pro(
                "2025-10-01T10:15",
                Seed::Text("Thanks for reaching out! I can come take a look tomorrow morning. Does 10 AM work for you?"),
            ),
            customer(
                "2025-10-01T10:30",
                Seed::Text("That works perfectly! See you then."),
            ),
            customer("2025-10-01T10:35", Seed::Proposal("2025-10-02T10:00")),
        ],
    },
    SeedThread {
        inquiry_id: "102",
        customer: "sarah_m",
        address: None,
        messages: &[customer(
            "2025-09-30T14:15",
            Seed::Form([
                "Clogged Drain",
                "Bathroom sink is completely clogged. Water won't drain at all.",
                "Email",
                "Within a week",
            ]),
        )],
    },
    SeedThread {
        inquiry_id: "103",
        customer: "mike_t",
        address: None,
        messages: &[
            customer(
                "2025-09-29T10:00",
                Seed::Form([
                    "Broken Pipe",
                    "Pipe under the sink is leaking badly.",
                    "Phone",
                    "Emergency (ASAP)",
                ]),
            ),
            pro(
                "2025-09-29T10:15",
                Seed::Text("I can be there in 2 hours. Is that okay?"),
            ),
            customer(
                "2025-09-29T10:20",
                Seed::Text("Thanks for the quick response! I'll be available tomorrow afternoon."),
            ),
        ],
    },
    SeedThread {
        inquiry_id: "104",
        customer: "emily_r",
        address: Some("123 Main Street, Apt 4B"),
        messages: &[
            customer(
                "2025-09-28T08:45",
                Seed::Form([
                    "Water Heater Issue",
                    "Water heater is making strange noises and not heating properly.",
                    "Text Message",
                    "Emergency (ASAP)",
                ]),
            ),
            pro(
                "2025-09-28T09:00",
                Seed::Text("I'll come take a look this afternoon. What's your address?"),
            ),
            customer(
                "2025-09-28T09:05",
                Seed::Text("123 Main Street, Apt 4B. Thank you!"),
            ),
        ],
    },
];

/// Fill `store` with the demo inbox
pub fn seed_demo_inbox(store: &ThreadStore) -> EngineResult<()> {
    let professional = Session::professional(PROFESSIONAL_NAME);
    for thread in INBOX {
        let customer = Session::customer(thread.customer);
        for message in thread.messages {
            let session = if message.from_customer {
                &customer
            } else {
                &professional
            };
            let built = match &message.seed {
                Seed::Form([issue, detail, contact, urgency]) => Message::form(
                    session,
                    vec![
                        FormField::new(ISSUE, *issue),
                        FormField::new(DETAIL, *detail),
                        FormField::new(CONTACT, *contact),
                        FormField::new(URGENCY, *urgency),
                    ],
                ),
                Seed::Text(text) => Message::plain(session, *text),
                Seed::Proposal(when) => Message::proposal(session, parse_instant(when)?),
            };
            store.append(thread.inquiry_id, built.sent_at(parse_instant(message.sent_at)?))?;
        }
        if let Some(address) = thread.address {
            store.set_address(thread.inquiry_id, address)?;
        }
    }
    tracing::debug!(threads = INBOX.len(), "Seeded demo inbox");
    Ok(())
}
