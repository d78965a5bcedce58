//! Pricing table
//!
//! One [`PlanSpec`] per tier. Prices are USD cents. Paid tiers grant access
//! for `access_days` from the completed purchase; the free tier never
//! expires.

use serde::Serialize;

use crate::domain::value_objects::Tier;

pub const CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSpec {
    pub tier: Tier,
    pub name: &'static str,
    pub price_cents: i64,
    pub currency: &'static str,
    /// Form generations over the whole access period
    pub form_quota: u32,
    /// AI prompts per UTC calendar month
    pub monthly_prompt_quota: u32,
    /// `None` for the free tier
    pub access_days: Option<u32>,
    pub household_seats: u32,
    pub features: &'static [&'static str],
}

pub static PRICING: [PlanSpec; 4] = [
    PlanSpec {
        tier: Tier::Free,
        name: "Free",
        price_cents: 0,
        currency: CURRENCY,
        form_quota: 1,
        monthly_prompt_quota: 10,
        access_days: None,
        household_seats: 1,
        features: &["community_stories", "agent_chat", "single_form"],
    },
    PlanSpec {
        tier: Tier::Starter,
        name: "Starter",
        price_cents: 2_900,
        currency: CURRENCY,
        form_quota: 3,
        monthly_prompt_quota: 100,
        access_days: Some(90),
        household_seats: 1,
        features: &["community_stories", "agent_chat", "form_generation", "document_checklists"],
    },
    PlanSpec {
        tier: Tier::Official,
        name: "Official",
        price_cents: 9_900,
        currency: CURRENCY,
        form_quota: 10,
        monthly_prompt_quota: 500,
        access_days: Some(365),
        household_seats: 1,
        features: &[
            "community_stories",
            "agent_chat",
            "form_generation",
            "document_checklists",
            "timeline_tracking",
            "priority_support",
        ],
    },
    PlanSpec {
        tier: Tier::Family,
        name: "Family",
        price_cents: 14_900,
        currency: CURRENCY,
        form_quota: 25,
        monthly_prompt_quota: 1_000,
        access_days: Some(365),
        household_seats: 5,
        features: &[
            "community_stories",
            "agent_chat",
            "form_generation",
            "document_checklists",
            "timeline_tracking",
            "priority_support",
            "household_members",
        ],
    },
];

pub fn plan(tier: Tier) -> &'static PlanSpec {
    match tier {
        Tier::Free => &PRICING[0],
        Tier::Starter => &PRICING[1],
        Tier::Official => &PRICING[2],
        Tier::Family => &PRICING[3],
    }
}
