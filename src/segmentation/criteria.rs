//! Segment criteria interpreter
//!
//! Criteria are concrete predicate types evaluated by a small interpreter,
//! not dynamic field access. Every field is optional; an absent criterion is
//! "no constraint".

use serde::{Deserialize, Serialize};

use crate::db::models::Customer;

/// Inclusive numeric range on money amounts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct AmountRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AmountRange {
    fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Inclusive numeric range on counts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CountRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl CountRange {
    fn contains(&self, value: i64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Segment membership rules. All present criteria must hold.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SegmentCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_spent: Option<AmountRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_orders: Option<CountRange>,
    /// Matches when the customer has ANY of these tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Matches when the customer's city is in this list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cities: Option<Vec<String>>,
}

impl SegmentCriteria {
    /// Whether the criteria include a tag predicate (plan-gated)
    pub fn uses_tags(&self) -> bool {
        self.tags.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Evaluate the criteria against a customer's current attributes
    pub fn matches(&self, customer: &Customer) -> bool {
        if let Some(range) = &self.total_spent {
            if !range.contains(customer.total_spent) {
                return false;
            }
        }
        if let Some(range) = &self.total_orders {
            if !range.contains(customer.total_orders) {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            if !tags.is_empty() && !tags.iter().any(|t| customer.tags.contains(t)) {
                return false;
            }
        }
        if let Some(cities) = &self.cities {
            if !cities.is_empty() {
                match &customer.city {
                    Some(city) if cities.contains(city) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_customer(total_spent: f64, total_orders: i64, tags: &[&str], city: Option<&str>) -> Customer {
        Customer {
            id: 1,
            tenant_id: 1,
            name: "test".to_string(),
            email: None,
            phone: None,
            city: city.map(String::from),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            total_orders,
            total_spent,
            last_order_at: None,
            segment_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_empty_criteria_matches_everyone() {
        let criteria = SegmentCriteria::default();
        assert!(criteria.matches(&make_customer(0.0, 0, &[], None)));
    }

    #[test]
    fn test_spend_range_bounds() {
        let criteria = SegmentCriteria {
            total_spent: Some(AmountRange {
                min: Some(100.0),
                max: Some(500.0),
            }),
            ..Default::default()
        };
        assert!(!criteria.matches(&make_customer(99.99, 0, &[], None)));
        assert!(criteria.matches(&make_customer(100.0, 0, &[], None)));
        assert!(criteria.matches(&make_customer(500.0, 0, &[], None)));
        assert!(!criteria.matches(&make_customer(500.01, 0, &[], None)));
    }

    #[test]
    fn test_open_ended_ranges() {
        let min_only = SegmentCriteria {
            total_orders: Some(CountRange {
                min: Some(5),
                max: None,
            }),
            ..Default::default()
        };
        assert!(min_only.matches(&make_customer(0.0, 1000, &[], None)));
        assert!(!min_only.matches(&make_customer(0.0, 4, &[], None)));
    }

    #[test]
    fn test_tags_or_semantics() {
        let criteria = SegmentCriteria {
            tags: Some(vec!["vip".to_string(), "wholesale".to_string()]),
            ..Default::default()
        };
        assert!(criteria.matches(&make_customer(0.0, 0, &["wholesale"], None)));
        assert!(criteria.matches(&make_customer(0.0, 0, &["vip", "other"], None)));
        assert!(!criteria.matches(&make_customer(0.0, 0, &["retail"], None)));
        assert!(!criteria.matches(&make_customer(0.0, 0, &[], None)));
    }

    #[test]
    fn test_city_membership() {
        let criteria = SegmentCriteria {
            cities: Some(vec!["Lisbon".to_string(), "Porto".to_string()]),
            ..Default::default()
        };
        assert!(criteria.matches(&make_customer(0.0, 0, &[], Some("Porto"))));
        assert!(!criteria.matches(&make_customer(0.0, 0, &[], Some("Faro"))));
        assert!(!criteria.matches(&make_customer(0.0, 0, &[], None)));
    }

    #[test]
    fn test_all_present_criteria_must_hold() {
        let criteria = SegmentCriteria {
            total_spent: Some(AmountRange {
                min: Some(100.0),
                max: None,
            }),
            tags: Some(vec!["vip".to_string()]),
            ..Default::default()
        };
        assert!(criteria.matches(&make_customer(150.0, 0, &["vip"], None)));
        assert!(!criteria.matches(&make_customer(150.0, 0, &[], None)));
        assert!(!criteria.matches(&make_customer(50.0, 0, &["vip"], None)));
    }

    #[test]
    fn test_uses_tags() {
        assert!(!SegmentCriteria::default().uses_tags());
        let with_tags = SegmentCriteria {
            tags: Some(vec!["vip".to_string()]),
            ..Default::default()
        };
        assert!(with_tags.uses_tags());
        let empty_tags = SegmentCriteria {
            tags: Some(vec![]),
            ..Default::default()
        };
        assert!(!empty_tags.uses_tags());
    }
}
