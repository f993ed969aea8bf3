//! Dashboard response model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::users::Role;

/// Headline numbers, scoped to the caller unless the caller is an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub scope: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users: Option<u64>,
    pub total_properties: u64,
    pub available_properties: u64,
    pub active_listings: u64,
    pub pending_applications: u64,
    pub active_agreements: u64,
    pub completed_payments: u64,
    pub overdue_payments: u64,
    pub total_revenue: Decimal,
}
