//! Subscription plan tiers, limits and feature gates
//!
//! The plan source is opaque to the engine (here: the `tenant.plan` column).
//! Gated operations call [`PlanTier::require`] before doing any work and fail
//! with `PlanRestricted` naming the required tier.

use serde::{Deserialize, Serialize};

use crate::utils::AppError;

/// Plan tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Starter,
    Business,
}

impl PlanTier {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Starter => "starter",
            PlanTier::Business => "business",
        }
    }
}

/// Plan-gated features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Redeem gift cards against orders
    GiftCards,
    /// Rule-based customer segmentation
    Segmentation,
    /// Tag criteria inside segment rules
    SegmentationTags,
    /// Customer tags
    CustomerTags,
}

impl Feature {
    pub fn name(self) -> &'static str {
        match self {
            Feature::GiftCards => "gift cards",
            Feature::Segmentation => "customer segmentation",
            Feature::SegmentationTags => "tag-based segmentation",
            Feature::CustomerTags => "customer tags",
        }
    }

    /// Lowest tier that includes the feature
    pub fn required_tier(self) -> PlanTier {
        match self {
            Feature::GiftCards => PlanTier::Starter,
            Feature::Segmentation => PlanTier::Starter,
            Feature::SegmentationTags => PlanTier::Business,
            Feature::CustomerTags => PlanTier::Starter,
        }
    }
}

/// Resource limits per tier
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlanLimits {
    pub max_products: u32,
    pub max_orders: u32,
    pub max_customers: u32,
    pub max_users: u32,
}

impl PlanTier {
    pub fn limits(self) -> PlanLimits {
        match self {
            PlanTier::Free => PlanLimits {
                max_products: 25,
                max_orders: 100,
                max_customers: 100,
                max_users: 1,
            },
            PlanTier::Starter => PlanLimits {
                max_products: 500,
                max_orders: 5_000,
                max_customers: 5_000,
                max_users: 5,
            },
            PlanTier::Business => PlanLimits {
                max_products: u32::MAX,
                max_orders: u32::MAX,
                max_customers: u32::MAX,
                max_users: u32::MAX,
            },
        }
    }

    /// Capability check: allow/deny
    pub fn allows(self, feature: Feature) -> bool {
        self >= feature.required_tier()
    }

    /// Capability check that fails with a PlanRestricted error naming the tier
    pub fn require(self, feature: Feature) -> Result<(), AppError> {
        if self.allows(feature) {
            Ok(())
        } else {
            Err(AppError::PlanRestricted(format!(
                "{} require the {} plan or higher",
                feature.name(),
                feature.required_tier().as_str()
            )))
        }
    }
}
