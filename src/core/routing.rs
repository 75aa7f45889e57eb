// src/core/routing.rs — Routing table (advisory next-stage tokens)

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::infra::errors::ForgeError;

/// The closed set of legal `next_agent` tokens.
///
/// Only the validator consults this; the orchestrator's sequence is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentRoute {
    #[default]
    DiscoveryLead,
    Research,
    CompositionLoop,
    SimulationLead,
    Fea,
    Complete,
}

impl AgentRoute {
    pub const ALL: [AgentRoute; 6] = [
        AgentRoute::DiscoveryLead,
        AgentRoute::Research,
        AgentRoute::CompositionLoop,
        AgentRoute::SimulationLead,
        AgentRoute::Fea,
        AgentRoute::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRoute::DiscoveryLead => "discovery_lead",
            AgentRoute::Research => "research",
            AgentRoute::CompositionLoop => "composition_loop",
            AgentRoute::SimulationLead => "simulation_lead",
            AgentRoute::Fea => "fea",
            AgentRoute::Complete => "complete",
        }
    }

    /// Comma-separated list of every token, for violation messages.
    pub fn token_list() -> String {
        Self::ALL
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for AgentRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRoute {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                ForgeError::InvalidInput(format!(
                    "next_agent must be one of [{}], got: {s}",
                    Self::token_list()
                ))
            })
    }
}
