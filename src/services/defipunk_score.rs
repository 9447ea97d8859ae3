//! DeFiPunk alignment scoring.
//!
//! A protocol's score is the weighted sum of six characteristics, each rated
//! 0-100. Protocols without a rating fall back to the `default` profile.

use crate::models::{DeFiPunkProtocol, Protocol, ProtocolStatus};

/// Weights in percent, summing to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    pub decentralization: u32,
    pub open_source: u32,
    pub self_custody: u32,
    pub privacy: u32,
    pub immutability: u32,
    pub permissionless: u32,
}

pub const SCORING_WEIGHTS: ScoringWeights = ScoringWeights {
    decentralization: 25,
    open_source: 20,
    self_custody: 20,
    privacy: 15,
    immutability: 10,
    permissionless: 10,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolCharacteristics {
    pub decentralization: u32,
    pub open_source: u32,
    pub self_custody: u32,
    pub privacy: u32,
    pub immutability: u32,
    pub permissionless: u32,
}

impl ProtocolCharacteristics {
    const fn new(
        decentralization: u32,
        open_source: u32,
        self_custody: u32,
        privacy: u32,
        immutability: u32,
        permissionless: u32,
    ) -> Self {
        Self {
            decentralization,
            open_source,
            self_custody,
            privacy,
            immutability,
            permissionless,
        }
    }

    /// Weighted score rounded half up to the nearest integer.
    pub fn score(&self, weights: &ScoringWeights) -> u32 {
        let weighted = self.decentralization * weights.decentralization
            + self.open_source * weights.open_source
            + self.self_custody * weights.self_custody
            + self.privacy * weights.privacy
            + self.immutability * weights.immutability
            + self.permissionless * weights.permissionless;
        (weighted + 50) / 100
    }
}

pub const DEFAULT_CHARACTERISTICS: ProtocolCharacteristics =
    ProtocolCharacteristics::new(50, 70, 80, 20, 60, 70);

const KNOWN_CHARACTERISTICS: &[(&str, ProtocolCharacteristics)] = &[
    ("uniswap", ProtocolCharacteristics::new(90, 100, 100, 30, 95, 100)),
    ("aave", ProtocolCharacteristics::new(85, 100, 100, 25, 90, 95)),
    ("compound", ProtocolCharacteristics::new(80, 100, 100, 20, 85, 90)),
    ("curve", ProtocolCharacteristics::new(85, 100, 100, 30, 90, 95)),
    ("makerdao", ProtocolCharacteristics::new(75, 100, 100, 25, 80, 85)),
    ("tornado-cash", ProtocolCharacteristics::new(95, 100, 100, 100, 100, 100)),
];

const EXCLUDED_CATEGORIES: [&str; 2] = ["CEX", "Chain"];
const MIN_TVL: f64 = 1_000_000.0;
const MAX_LISTED: usize = 50;

pub fn characteristics_for(slug: &str) -> ProtocolCharacteristics {
    let slug = slug.to_lowercase();
    KNOWN_CHARACTERISTICS
        .iter()
        .find(|(known, _)| *known == slug)
        .map(|(_, characteristics)| *characteristics)
        .unwrap_or(DEFAULT_CHARACTERISTICS)
}

pub fn calculate_alignment_score(slug: &str) -> u32 {
    characteristics_for(slug).score(&SCORING_WEIGHTS)
}

pub fn status_from_score(score: u32) -> ProtocolStatus {
    if score >= 80 {
        ProtocolStatus::HighScore
    } else if score >= 60 {
        ProtocolStatus::MediumScore
    } else {
        ProtocolStatus::LowScore
    }
}

pub fn transform_protocol(protocol: &Protocol) -> DeFiPunkProtocol {
    let alignment_score = calculate_alignment_score(&protocol.slug);

    DeFiPunkProtocol {
        id: protocol.id.clone(),
        name: protocol.name.clone(),
        href: format!("/protocol/{}", protocol.slug),
        status: status_from_score(alignment_score),
        alignment_score,
        category: protocol.category.clone(),
        tvl: protocol.tvl,
        logo: protocol.logo.clone(),
        change_1d: protocol.change_1d,
        chains: protocol.chains.clone(),
        description: protocol.description.clone(),
    }
}

/// Drops CEX/Chain listings and anything at or below $1M TVL, then returns
/// the top 50 by score. Ties keep DefiLlama's order.
pub fn filter_and_sort_protocols(protocols: &[Protocol]) -> Vec<DeFiPunkProtocol> {
    let mut scored: Vec<DeFiPunkProtocol> = protocols
        .iter()
        .filter(|p| !EXCLUDED_CATEGORIES.contains(&p.category.as_str()) && p.tvl > MIN_TVL)
        .map(transform_protocol)
        .collect();

    scored.sort_by(|a, b| b.alignment_score.cmp(&a.alignment_score));
    scored.truncate(MAX_LISTED);
    scored
}
