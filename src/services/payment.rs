//! Payment Service
//!
//! Every write after creation is versioned: the caller sends the `version`
//! it read, and the row is only updated while it still has that version.

use chrono::Duration;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    ActiveValue::Set,
    sea_query::Expr,
};
use tracing::{debug, info, warn};

use crate::auth::access::{Capability, Principal, authorize, ensure_owner};
use crate::entities::payments::{self, PaymentStatus};
use crate::entities::prelude::*;
use crate::entities::users::Role;
use crate::error::ApiError;
use crate::models::payment::{
    CreatePaymentRequest, PaymentFailureRequest, PaymentStatusRequest, PaymentTotals, TotalsQuery,
    UpdatePaymentRequest,
};
use crate::queries::pagination::{Page, PageRequest, fetch_all, fetch_page};
use crate::queries::payment::{self as payment_query, PaymentFilter};
use crate::services::support::{business_reference, days_from_now, now, referenced_property, referenced_user};

/// Upper bound on the retry backoff
pub const MAX_RETRY_DELAY_MINUTES: i64 = 24 * 60;

/// Backoff after the `retry_count`-th failure: 2^n minutes, capped at a day.
pub fn retry_delay(retry_count: i32) -> Duration {
    let minutes = u32::try_from(retry_count)
        .ok()
        .and_then(|n| 1i64.checked_shl(n))
        .filter(|m| *m > 0)
        .map_or(MAX_RETRY_DELAY_MINUTES, |m| m.min(MAX_RETRY_DELAY_MINUTES));
    Duration::minutes(minutes)
}

#[derive(Clone)]
pub struct PaymentService {
    db: DatabaseConnection,
}

impl PaymentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, id: i32) -> Result<payments::Model, ApiError> {
        Payments::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("Payment", id))
    }

    fn ensure_party(actor: &Principal, payment: &payments::Model) -> Result<(), ApiError> {
        if actor.user_id == payment.tenant_id {
            return Ok(());
        }
        ensure_owner(actor, payment.landlord_id)
    }

    fn ensure_manager(actor: &Principal, payment: &payments::Model) -> Result<(), ApiError> {
        authorize(actor, Capability::ManagePayments)?;
        ensure_owner(actor, payment.landlord_id)
    }

    fn scoped(actor: &Principal, mut filter: PaymentFilter) -> Result<PaymentFilter, ApiError> {
        match actor.role {
            Role::Admin => {}
            Role::Landlord => filter.landlord_id = Some(actor.user_id),
            Role::Tenant => filter.tenant_id = Some(actor.user_id),
            Role::User => {
                return Err(ApiError::Forbidden("Role USER cannot view payments".into()));
            }
        }
        Ok(filter)
    }

    /// Apply `changes` only if the row is still at `expected_version`.
    ///
    /// Runs `UPDATE .. SET .., version = version + 1 WHERE id = ? AND version = ?`.
    async fn versioned_update(
        &self,
        id: i32,
        expected_version: i64,
        mut changes: payments::ActiveModel,
    ) -> Result<payments::Model, ApiError> {
        // update_many bypasses the ActiveModel hook
        changes.updated_at = Set(now());

        let result = Payments::update_many()
            .set(changes)
            .col_expr(payments::Column::Version, Expr::col(payments::Column::Version).add(1))
            .filter(payments::Column::Id.eq(id))
            .filter(payments::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            let current = self.find(id).await?;
            warn!(id, expected_version, current_version = current.version, "Stale payment update rejected");
            return Err(ApiError::Conflict(format!(
                "Payment {id} was modified concurrently (expected version {expected_version}, found {})",
                current.version
            )));
        }

        self.find(id).await
    }

    pub async fn get(&self, actor: &Principal, id: i32) -> Result<payments::Model, ApiError> {
        let payment = self.find(id).await?;
        Self::ensure_party(actor, &payment)?;
        Ok(payment)
    }

    pub async fn list(&self, actor: &Principal, page: &PageRequest) -> Result<Page<payments::Model>, ApiError> {
        self.search(actor, PaymentFilter::default(), page).await
    }

    pub async fn search(
        &self,
        actor: &Principal,
        filter: PaymentFilter,
        page: &PageRequest,
    ) -> Result<Page<payments::Model>, ApiError> {
        let filter = Self::scoped(actor, filter)?;
        debug!(?filter, "Searching payments");
        fetch_page(&self.db, Payments::find().filter(filter.condition()), page).await
    }

    pub async fn count(&self, actor: &Principal, filter: PaymentFilter) -> Result<u64, ApiError> {
        let filter = Self::scoped(actor, filter)?;
        Ok(payment_query::count(&self.db, &filter).await?)
    }

    pub async fn create(&self, actor: &Principal, request: CreatePaymentRequest) -> Result<payments::Model, ApiError> {
        authorize(actor, Capability::MakePayments)?;
        request.validate().map_err(ApiError::Validation)?;

        let property = referenced_property(&self.db, request.property_id).await?;

        let tenant_id = match actor.role {
            Role::Tenant => match request.tenant_id {
                Some(id) if id != actor.user_id => {
                    return Err(ApiError::Forbidden("Tenants can only record their own payments".into()));
                }
                _ => actor.user_id,
            },
            _ => {
                ensure_owner(actor, property.landlord_id)?;
                request
                    .tenant_id
                    .ok_or_else(|| ApiError::Validation("tenantId is required".into()))?
            }
        };
        referenced_user(&self.db, tenant_id).await?;

        if let Some(agreement_id) = request.agreement_id {
            let agreement = Agreements::find_by_id(agreement_id)
                .one(&self.db)
                .await?
                .ok_or_else(|| ApiError::Validation(format!("Agreement {agreement_id} does not exist")))?;
            if agreement.property_id != property.id || agreement.tenant_id != tenant_id {
                return Err(ApiError::Validation(format!(
                    "Agreement {agreement_id} does not cover this tenant and property"
                )));
            }
        }

        let total_amount = request.total();
        let payment_reference = request
            .payment_reference
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| business_reference("PAY"));

        let payment = payments::ActiveModel {
            tenant_id: Set(tenant_id),
            landlord_id: Set(property.landlord_id),
            property_id: Set(property.id),
            agreement_id: Set(request.agreement_id),
            payment_type: Set(request.payment_type),
            status: Set(PaymentStatus::Pending),
            payment_reference: Set(payment_reference),
            amount: Set(request.amount),
            payment_date: Set(request.payment_date),
            due_date: Set(request.due_date),
            method: Set(request.method),
            transaction_id: Set(request.transaction_id),
            card_last_four: Set(request.card_last_four),
            bank_account_last_four: Set(request.bank_account_last_four),
            payment_description: Set(request.payment_description),
            late_fee: Set(request.late_fee),
            processing_fee: Set(request.processing_fee),
            total_amount: Set(total_amount),
            retry_count: Set(0),
            version: Set(0),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(
            id = payment.id,
            reference = %payment.payment_reference,
            amount = %payment.amount,
            "Payment created"
        );
        Ok(payment)
    }

    pub async fn update(
        &self,
        actor: &Principal,
        id: i32,
        patch: UpdatePaymentRequest,
    ) -> Result<payments::Model, ApiError> {
        patch.validate().map_err(ApiError::Validation)?;

        let existing = self.find(id).await?;
        Self::ensure_manager(actor, &existing)?;

        if let Some(agreement_id) = patch.agreement_id.value().copied() {
            let agreement = Agreements::find_by_id(agreement_id)
                .one(&self.db)
                .await?
                .ok_or_else(|| ApiError::Validation(format!("Agreement {agreement_id} does not exist")))?;
            if agreement.property_id != existing.property_id {
                return Err(ApiError::Validation(format!(
                    "Agreement {agreement_id} is for another property"
                )));
            }
        }

        let mut changes = payments::ActiveModel {
            ..Default::default()
        };
        if let Some(total) =
            patch.recomputed_total(existing.amount, existing.late_fee, existing.processing_fee)
        {
            changes.total_amount = Set(total);
        }
        patch.payment_type.apply_required("type", &mut changes.payment_type)?;
        patch.amount.apply_required("amount", &mut changes.amount)?;
        patch.payment_date.apply_required("paymentDate", &mut changes.payment_date)?;
        patch.due_date.apply_required("dueDate", &mut changes.due_date)?;
        patch.late_fee.apply_required("lateFee", &mut changes.late_fee)?;
        patch.processing_fee.apply_required("processingFee", &mut changes.processing_fee)?;
        patch.total_amount.apply_required("totalAmount", &mut changes.total_amount)?;
        patch.method.apply_nullable(&mut changes.method);
        patch.transaction_id.apply_nullable(&mut changes.transaction_id);
        patch.card_last_four.apply_nullable(&mut changes.card_last_four);
        patch.bank_account_last_four.apply_nullable(&mut changes.bank_account_last_four);
        patch.payment_description.apply_nullable(&mut changes.payment_description);
        patch.agreement_id.apply_nullable(&mut changes.agreement_id);

        let payment = self.versioned_update(id, patch.version, changes).await?;
        info!(id, version = payment.version, "Payment updated");
        Ok(payment)
    }

    /// Tenants may cancel their own payment; everything else is managed by
    /// the landlord.
    pub async fn update_status(
        &self,
        actor: &Principal,
        id: i32,
        request: PaymentStatusRequest,
    ) -> Result<payments::Model, ApiError> {
        let existing = self.find(id).await?;
        if request.status == PaymentStatus::Cancelled && actor.user_id == existing.tenant_id {
            authorize(actor, Capability::MakePayments)?;
        } else {
            Self::ensure_manager(actor, &existing)?;
        }
        check_transition(&existing, request.status)?;

        let mut changes = payments::ActiveModel {
            status: Set(request.status),
            ..Default::default()
        };
        if request.status == PaymentStatus::Completed {
            changes.processed_at = Set(Some(now()));
        }
        if let Some(transaction_id) = request.transaction_id {
            changes.transaction_id = Set(Some(transaction_id));
        }

        let payment = self.versioned_update(id, request.version, changes).await?;
        info!(id, status = ?request.status, version = payment.version, "Payment status updated");
        Ok(payment)
    }

    /// Mark a payment FAILED and schedule its next retry.
    pub async fn record_failure(
        &self,
        actor: &Principal,
        id: i32,
        request: PaymentFailureRequest,
    ) -> Result<payments::Model, ApiError> {
        let existing = self.find(id).await?;
        Self::ensure_manager(actor, &existing)?;
        check_transition(&existing, PaymentStatus::Failed)?;

        let retry_count = existing.retry_count.saturating_add(1);
        let next_retry_at = now() + retry_delay(retry_count);

        let changes = payments::ActiveModel {
            status: Set(PaymentStatus::Failed),
            failure_reason: Set(Some(request.reason)),
            retry_count: Set(retry_count),
            next_retry_at: Set(Some(next_retry_at)),
            ..Default::default()
        };

        let payment = self.versioned_update(id, request.version, changes).await?;
        warn!(id, retry_count, next_retry_at = %next_retry_at, "Payment failed");
        Ok(payment)
    }

    pub async fn delete(&self, actor: &Principal, id: i32) -> Result<(), ApiError> {
        let existing = self.find(id).await?;
        Self::ensure_manager(actor, &existing)?;

        Payments::delete_by_id(id).exec(&self.db).await?;
        info!(id, "Payment deleted");
        Ok(())
    }

    /// Pending payments already past their due date.
    pub async fn overdue(&self, actor: &Principal, page: &PageRequest) -> Result<Page<payments::Model>, ApiError> {
        let filter = PaymentFilter {
            status: Some(PaymentStatus::Pending),
            due_before: Some(now()),
            ..Default::default()
        };
        self.search(actor, filter, page).await
    }

    /// Pending payments due between now and `days` from now.
    pub async fn due_soon(&self, actor: &Principal, days: Option<i64>) -> Result<Vec<payments::Model>, ApiError> {
        let days = days.unwrap_or(7);
        if days < 0 {
            return Err(ApiError::Validation("days cannot be negative".into()));
        }
        let filter = Self::scoped(
            actor,
            PaymentFilter {
                status: Some(PaymentStatus::Pending),
                due_from: Some(now()),
                due_to: Some(days_from_now(days)),
                ..Default::default()
            },
        )?;
        fetch_all(&self.db, Payments::find().filter(filter.condition())).await
    }

    /// Failed payments whose retry time has come.
    pub async fn retry_due(&self, actor: &Principal, page: &PageRequest) -> Result<Page<payments::Model>, ApiError> {
        authorize(actor, Capability::ManagePayments)?;
        let filter = PaymentFilter {
            status: Some(PaymentStatus::Failed),
            next_retry_before: Some(now()),
            ..Default::default()
        };
        self.search(actor, filter, page).await
    }

    pub async fn totals(&self, actor: &Principal, query: TotalsQuery) -> Result<PaymentTotals, ApiError> {
        let status = query.status.unwrap_or(PaymentStatus::Completed);
        let filter = Self::scoped(
            actor,
            PaymentFilter {
                tenant_id: query.tenant_id,
                landlord_id: query.landlord_id,
                property_id: query.property_id,
                status: Some(status),
                ..Default::default()
            },
        )?;

        Ok(PaymentTotals {
            status,
            count: payment_query::count(&self.db, &filter).await?,
            total_amount: payment_query::sum_amount(&self.db, &filter).await?,
        })
    }
}

fn check_transition(payment: &payments::Model, next: PaymentStatus) -> Result<(), ApiError> {
    if payment.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(ApiError::Conflict(format!(
            "Payment {} cannot move from {:?} to {:?}",
            payment.id, payment.status, next
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles() {
        assert_eq!(retry_delay(1), Duration::minutes(2));
        assert_eq!(retry_delay(2), Duration::minutes(4));
        assert_eq!(retry_delay(10), Duration::minutes(1024));
    }

    #[test]
    fn test_retry_delay_is_capped() {
        assert_eq!(retry_delay(11), Duration::minutes(MAX_RETRY_DELAY_MINUTES));
        assert_eq!(retry_delay(400), Duration::minutes(MAX_RETRY_DELAY_MINUTES));
        assert_eq!(retry_delay(-1), Duration::minutes(MAX_RETRY_DELAY_MINUTES));
    }
}
