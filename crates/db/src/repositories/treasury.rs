//! Treasury repositories over [`SeaStore`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, Set,
};
use tally_core::RepositoryError;
use tally_core::treasury::{
    FilingPeriod, FilingStatus, PaymentStatus, TaxFiling, TaxFilingRepository, TaxPayment,
    TaxPaymentRepository, TaxRate, TaxRateRepository, TaxRateStatus, TaxType, Taxpayer,
    TaxpayerRepository, TaxpayerStatus, TaxpayerType,
};
use tally_shared::types::{Address, MinorUnits, TaxFilingId, TaxPaymentId, TaxRateId, TaxpayerId};

use super::{SeaStore, convert, decode, encode, parse, stale_or_missing, storage, write_err};
use crate::entities::{tax_filings, tax_payments, tax_rates, taxpayers};

impl TryFrom<tax_rates::Model> for TaxRate {
    type Error = RepositoryError;

    fn try_from(m: tax_rates::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TaxRateId::from_uuid(m.id),
            tax_type: parse(&m.tax_type)?,
            name: m.name,
            description: m.description,
            rate: m.rate,
            bracket_type: parse(&m.bracket_type)?,
            min_amount: m.min_amount,
            max_amount: m.max_amount,
            status: parse(&m.status)?,
            category: m.category,
            jurisdiction_code: m.jurisdiction_code,
            effective_date: m.effective_date,
            expiration_date: m.expiration_date,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl From<&TaxRate> for tax_rates::ActiveModel {
    fn from(r: &TaxRate) -> Self {
        Self {
            id: Set(r.id.into_inner()),
            tax_type: Set(r.tax_type.as_str().to_string()),
            name: Set(r.name.clone()),
            description: Set(r.description.clone()),
            rate: Set(r.rate),
            bracket_type: Set(r.bracket_type.as_str().to_string()),
            min_amount: Set(r.min_amount),
            max_amount: Set(r.max_amount),
            status: Set(r.status.as_str().to_string()),
            category: Set(r.category.clone()),
            jurisdiction_code: Set(r.jurisdiction_code.clone()),
            effective_date: Set(r.effective_date),
            expiration_date: Set(r.expiration_date),
            created_at: Set(r.created_at),
            updated_at: Set(r.updated_at),
        }
    }
}

impl TryFrom<taxpayers::Model> for Taxpayer {
    type Error = RepositoryError;

    fn try_from(m: taxpayers::Model) -> Result<Self, Self::Error> {
        let exemption_codes: BTreeSet<String> = decode(&m.exemption_codes)?;
        Ok(Self {
            id: TaxpayerId::from_uuid(m.id),
            taxpayer_type: parse(&m.taxpayer_type)?,
            status: parse(&m.status)?,
            name: m.name,
            tax_identifier: m.tax_identifier,
            contact_email: m.contact_email,
            contact_phone: m.contact_phone,
            address: Address {
                street: m.street,
                city: m.city,
                state: m.state,
                country: m.country,
                postal_code: m.postal_code,
            },
            exemption_codes,
            annual_revenue: m.annual_revenue,
            business_type: m.business_type,
            industry: m.industry,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

fn taxpayer_model(t: &Taxpayer) -> Result<taxpayers::ActiveModel, RepositoryError> {
    Ok(taxpayers::ActiveModel {
        id: Set(t.id.into_inner()),
        taxpayer_type: Set(t.taxpayer_type.as_str().to_string()),
        status: Set(t.status.as_str().to_string()),
        name: Set(t.name.clone()),
        tax_identifier: Set(t.tax_identifier.clone()),
        contact_email: Set(t.contact_email.clone()),
        contact_phone: Set(t.contact_phone.clone()),
        street: Set(t.address.street.clone()),
        city: Set(t.address.city.clone()),
        state: Set(t.address.state.clone()),
        country: Set(t.address.country.clone()),
        postal_code: Set(t.address.postal_code.clone()),
        exemption_codes: Set(encode(&t.exemption_codes)?),
        annual_revenue: Set(t.annual_revenue),
        business_type: Set(t.business_type.clone()),
        industry: Set(t.industry.clone()),
        created_at: Set(t.created_at),
        updated_at: Set(t.updated_at),
    })
}

impl TryFrom<tax_filings::Model> for TaxFiling {
    type Error = RepositoryError;

    fn try_from(m: tax_filings::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TaxFilingId::from_uuid(m.id),
            taxpayer_id: TaxpayerId::from_uuid(m.taxpayer_id),
            tax_year: m.tax_year,
            period: parse(&m.period)?,
            period_start: m.period_start,
            period_end: m.period_end,
            filing_type: parse(&m.filing_type)?,
            status: parse(&m.status)?,
            gross_income: m.gross_income,
            taxable_income: m.taxable_income,
            total_sales: m.total_sales,
            taxable_amount: m.taxable_amount,
            tax_calculated: m.tax_calculated,
            tax_paid: m.tax_paid,
            submission_date: m.submission_date,
            acceptance_date: m.acceptance_date,
            due_date: m.due_date,
            deductions: decode(&m.deductions)?,
            credits: decode(&m.credits)?,
            notes: m.notes,
            version: m.version,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

fn filing_model(f: &TaxFiling) -> Result<tax_filings::ActiveModel, RepositoryError> {
    Ok(tax_filings::ActiveModel {
        id: Set(f.id.into_inner()),
        taxpayer_id: Set(f.taxpayer_id.into_inner()),
        tax_year: Set(f.tax_year),
        period: Set(f.period.as_str().to_string()),
        period_start: Set(f.period_start),
        period_end: Set(f.period_end),
        filing_type: Set(f.filing_type.as_str().to_string()),
        status: Set(f.status.as_str().to_string()),
        gross_income: Set(f.gross_income),
        taxable_income: Set(f.taxable_income),
        total_sales: Set(f.total_sales),
        taxable_amount: Set(f.taxable_amount),
        tax_calculated: Set(f.tax_calculated),
        tax_paid: Set(f.tax_paid),
        submission_date: Set(f.submission_date),
        acceptance_date: Set(f.acceptance_date),
        due_date: Set(f.due_date),
        deductions: Set(encode(&f.deductions)?),
        credits: Set(encode(&f.credits)?),
        notes: Set(f.notes.clone()),
        version: Set(f.version),
        created_at: Set(f.created_at),
        updated_at: Set(f.updated_at),
    })
}

impl TryFrom<tax_payments::Model> for TaxPayment {
    type Error = RepositoryError;

    fn try_from(m: tax_payments::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TaxPaymentId::from_uuid(m.id),
            taxpayer_id: TaxpayerId::from_uuid(m.taxpayer_id),
            filing_id: m.filing_id.map(TaxFilingId::from_uuid),
            tax_type: parse(&m.tax_type)?,
            amount: m.amount,
            payment_method: parse(&m.payment_method)?,
            status: parse(&m.status)?,
            payment_date: m.payment_date,
            confirmation_code: m.confirmation_code,
            notes: m.notes,
            processed_at: m.processed_at,
            refunded_at: m.refunded_at,
            version: m.version,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl From<&TaxPayment> for tax_payments::ActiveModel {
    fn from(p: &TaxPayment) -> Self {
        Self {
            id: Set(p.id.into_inner()),
            taxpayer_id: Set(p.taxpayer_id.into_inner()),
            filing_id: Set(p.filing_id.map(TaxFilingId::into_inner)),
            tax_type: Set(p.tax_type.as_str().to_string()),
            amount: Set(p.amount),
            payment_method: Set(p.payment_method.as_str().to_string()),
            status: Set(p.status.as_str().to_string()),
            payment_date: Set(p.payment_date),
            confirmation_code: Set(p.confirmation_code.clone()),
            notes: Set(p.notes.clone()),
            processed_at: Set(p.processed_at),
            refunded_at: Set(p.refunded_at),
            version: Set(p.version),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
        }
    }
}

impl SeaStore {
    async fn rates(
        &self,
        query: Select<tax_rates::Entity>,
    ) -> Result<Vec<TaxRate>, RepositoryError> {
        let rows = query
            .order_by_asc(tax_rates::Column::CreatedAt)
            .order_by_asc(tax_rates::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?;
        convert(rows)
    }

    async fn taxpayers(
        &self,
        query: Select<taxpayers::Entity>,
    ) -> Result<Vec<Taxpayer>, RepositoryError> {
        let rows = query
            .order_by_asc(taxpayers::Column::CreatedAt)
            .order_by_asc(taxpayers::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?;
        convert(rows)
    }

    async fn filings(
        &self,
        query: Select<tax_filings::Entity>,
    ) -> Result<Vec<TaxFiling>, RepositoryError> {
        let rows = query
            .order_by_asc(tax_filings::Column::CreatedAt)
            .order_by_asc(tax_filings::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?;
        convert(rows)
    }

    async fn payments(
        &self,
        query: Select<tax_payments::Entity>,
    ) -> Result<Vec<TaxPayment>, RepositoryError> {
        let rows = query
            .order_by_asc(tax_payments::Column::CreatedAt)
            .order_by_asc(tax_payments::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage)?;
        convert(rows)
    }
}

#[async_trait]
impl TaxRateRepository for SeaStore {
    async fn get_by_id(&self, id: TaxRateId) -> Result<TaxRate, RepositoryError> {
        tax_rates::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("tax rate", id))?
            .try_into()
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<TaxRate>, RepositoryError> {
        self.rates(tax_rates::Entity::find().limit(limit).offset(offset))
            .await
    }

    async fn list_by_type(&self, tax_type: TaxType) -> Result<Vec<TaxRate>, RepositoryError> {
        self.rates(
            tax_rates::Entity::find().filter(tax_rates::Column::TaxType.eq(tax_type.as_str())),
        )
        .await
    }

    async fn list_active(&self, date: NaiveDate) -> Result<Vec<TaxRate>, RepositoryError> {
        let rates = self
            .rates(
                tax_rates::Entity::find()
                    .filter(tax_rates::Column::Status.eq(TaxRateStatus::Active.as_str())),
            )
            .await?;
        Ok(rates.into_iter().filter(|r| r.is_in_effect(date)).collect())
    }

    async fn list_by_jurisdiction(
        &self,
        jurisdiction_code: &str,
    ) -> Result<Vec<TaxRate>, RepositoryError> {
        self.rates(
            tax_rates::Entity::find()
                .filter(tax_rates::Column::JurisdictionCode.eq(jurisdiction_code)),
        )
        .await
    }

    async fn rates_for_income(
        &self,
        jurisdiction_code: &str,
        amount: MinorUnits,
        date: NaiveDate,
    ) -> Result<Vec<TaxRate>, RepositoryError> {
        let rates = self
            .rates(
                tax_rates::Entity::find()
                    .filter(tax_rates::Column::TaxType.eq(TaxType::Income.as_str()))
                    .filter(tax_rates::Column::JurisdictionCode.eq(jurisdiction_code))
                    .filter(tax_rates::Column::Status.eq(TaxRateStatus::Active.as_str())),
            )
            .await?;
        Ok(rates
            .into_iter()
            .filter(|r| r.is_in_effect(date) && r.is_applicable(amount))
            .collect())
    }

    async fn create(&self, rate: &TaxRate) -> Result<(), RepositoryError> {
        tax_rates::ActiveModel::from(rate)
            .insert(&self.db)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn update(&self, rate: &TaxRate) -> Result<TaxRate, RepositoryError> {
        let result = tax_rates::Entity::update_many()
            .set(tax_rates::ActiveModel::from(rate))
            .filter(tax_rates::Column::Id.eq(rate.id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(storage)?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("tax rate", rate.id));
        }
        Ok(rate.clone())
    }
}

#[async_trait]
impl TaxpayerRepository for SeaStore {
    async fn get_by_id(&self, id: TaxpayerId) -> Result<Taxpayer, RepositoryError> {
        taxpayers::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("taxpayer", id))?
            .try_into()
    }

    async fn get_by_tax_identifier(
        &self,
        tax_identifier: &str,
    ) -> Result<Option<Taxpayer>, RepositoryError> {
        taxpayers::Entity::find()
            .filter(taxpayers::Column::TaxIdentifier.eq(tax_identifier))
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(Taxpayer::try_from)
            .transpose()
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Taxpayer>, RepositoryError> {
        self.taxpayers(taxpayers::Entity::find().limit(limit).offset(offset))
            .await
    }

    async fn list_by_type(
        &self,
        taxpayer_type: TaxpayerType,
    ) -> Result<Vec<Taxpayer>, RepositoryError> {
        self.taxpayers(
            taxpayers::Entity::find()
                .filter(taxpayers::Column::TaxpayerType.eq(taxpayer_type.as_str())),
        )
        .await
    }

    async fn list_by_status(
        &self,
        status: TaxpayerStatus,
    ) -> Result<Vec<Taxpayer>, RepositoryError> {
        self.taxpayers(
            taxpayers::Entity::find().filter(taxpayers::Column::Status.eq(status.as_str())),
        )
        .await
    }

    async fn list_businesses_by_industry(
        &self,
        industry: &str,
    ) -> Result<Vec<Taxpayer>, RepositoryError> {
        self.taxpayers(
            taxpayers::Entity::find()
                .filter(taxpayers::Column::TaxpayerType.eq(TaxpayerType::Business.as_str()))
                .filter(taxpayers::Column::Industry.eq(industry)),
        )
        .await
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<Taxpayer>, RepositoryError> {
        let pattern = format!("%{}%", query.to_lowercase());
        let lower = |col: taxpayers::Column| {
            Expr::expr(Func::lower(Expr::col(col))).like(pattern.as_str())
        };
        self.taxpayers(
            taxpayers::Entity::find()
                .filter(
                    Condition::any()
                        .add(lower(taxpayers::Column::Name))
                        .add(lower(taxpayers::Column::TaxIdentifier))
                        .add(lower(taxpayers::Column::ContactEmail)),
                )
                .limit(limit),
        )
        .await
    }

    async fn create(&self, taxpayer: &Taxpayer) -> Result<(), RepositoryError> {
        taxpayer_model(taxpayer)?
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "taxpayer", "tax_identifier", &taxpayer.tax_identifier))?;
        Ok(())
    }

    async fn update(&self, taxpayer: &Taxpayer) -> Result<Taxpayer, RepositoryError> {
        let result = taxpayers::Entity::update_many()
            .set(taxpayer_model(taxpayer)?)
            .filter(taxpayers::Column::Id.eq(taxpayer.id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(|e| write_err(e, "taxpayer", "tax_identifier", &taxpayer.tax_identifier))?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("taxpayer", taxpayer.id));
        }
        Ok(taxpayer.clone())
    }
}

#[async_trait]
impl TaxFilingRepository for SeaStore {
    async fn get_by_id(&self, id: TaxFilingId) -> Result<TaxFiling, RepositoryError> {
        tax_filings::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("tax filing", id))?
            .try_into()
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<TaxFiling>, RepositoryError> {
        self.filings(tax_filings::Entity::find().limit(limit).offset(offset))
            .await
    }

    async fn list_by_taxpayer(
        &self,
        taxpayer_id: TaxpayerId,
    ) -> Result<Vec<TaxFiling>, RepositoryError> {
        self.filings(
            tax_filings::Entity::find()
                .filter(tax_filings::Column::TaxpayerId.eq(taxpayer_id.into_inner())),
        )
        .await
    }

    async fn list_by_status(
        &self,
        status: FilingStatus,
    ) -> Result<Vec<TaxFiling>, RepositoryError> {
        self.filings(
            tax_filings::Entity::find().filter(tax_filings::Column::Status.eq(status.as_str())),
        )
        .await
    }

    async fn list_by_period(
        &self,
        tax_year: i32,
        period: FilingPeriod,
    ) -> Result<Vec<TaxFiling>, RepositoryError> {
        self.filings(
            tax_filings::Entity::find()
                .filter(tax_filings::Column::TaxYear.eq(tax_year))
                .filter(tax_filings::Column::Period.eq(period.as_str())),
        )
        .await
    }

    async fn list_by_year(&self, tax_year: i32) -> Result<Vec<TaxFiling>, RepositoryError> {
        self.filings(
            tax_filings::Entity::find().filter(tax_filings::Column::TaxYear.eq(tax_year)),
        )
        .await
    }

    async fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<TaxFiling>, RepositoryError> {
        self.filings(
            tax_filings::Entity::find()
                .filter(tax_filings::Column::DueDate.lt(now))
                .filter(tax_filings::Column::Status.is_not_in([
                    FilingStatus::Accepted.as_str(),
                    FilingStatus::Rejected.as_str(),
                ])),
        )
        .await
    }

    async fn list_recently_submitted(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<TaxFiling>, RepositoryError> {
        self.filings(
            tax_filings::Entity::find().filter(tax_filings::Column::SubmissionDate.gte(since)),
        )
        .await
    }

    async fn create(&self, filing: &TaxFiling) -> Result<(), RepositoryError> {
        filing_model(filing)?
            .insert(&self.db)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn update(&self, filing: &TaxFiling) -> Result<TaxFiling, RepositoryError> {
        let mut stored = filing.clone();
        stored.version += 1;

        let result = tax_filings::Entity::update_many()
            .set(filing_model(&stored)?)
            .filter(tax_filings::Column::Id.eq(filing.id.into_inner()))
            .filter(tax_filings::Column::Version.eq(filing.version))
            .exec(&self.db)
            .await
            .map_err(storage)?;

        if result.rows_affected == 0 {
            let exists = tax_filings::Entity::find_by_id(filing.id.into_inner())
                .one(&self.db)
                .await
                .map_err(storage)?
                .is_some();
            return Err(stale_or_missing(exists, "tax filing", filing.id));
        }
        Ok(stored)
    }
}

#[async_trait]
impl TaxPaymentRepository for SeaStore {
    async fn get_by_id(&self, id: TaxPaymentId) -> Result<TaxPayment, RepositoryError> {
        tax_payments::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("tax payment", id))?
            .try_into()
    }

    async fn get_by_confirmation_code(
        &self,
        code: &str,
    ) -> Result<Option<TaxPayment>, RepositoryError> {
        tax_payments::Entity::find()
            .filter(tax_payments::Column::ConfirmationCode.eq(code))
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(TaxPayment::try_from)
            .transpose()
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<TaxPayment>, RepositoryError> {
        self.payments(tax_payments::Entity::find().limit(limit).offset(offset))
            .await
    }

    async fn list_by_taxpayer(
        &self,
        taxpayer_id: TaxpayerId,
    ) -> Result<Vec<TaxPayment>, RepositoryError> {
        self.payments(
            tax_payments::Entity::find()
                .filter(tax_payments::Column::TaxpayerId.eq(taxpayer_id.into_inner())),
        )
        .await
    }

    async fn list_by_filing(
        &self,
        filing_id: TaxFilingId,
    ) -> Result<Vec<TaxPayment>, RepositoryError> {
        self.payments(
            tax_payments::Entity::find()
                .filter(tax_payments::Column::FilingId.eq(filing_id.into_inner())),
        )
        .await
    }

    async fn list_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<TaxPayment>, RepositoryError> {
        self.payments(
            tax_payments::Entity::find()
                .filter(tax_payments::Column::Status.eq(status.as_str())),
        )
        .await
    }

    async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaxPayment>, RepositoryError> {
        self.payments(
            tax_payments::Entity::find()
                .filter(tax_payments::Column::PaymentDate.between(start, end)),
        )
        .await
    }

    async fn list_recent(&self, since: DateTime<Utc>) -> Result<Vec<TaxPayment>, RepositoryError> {
        self.payments(
            tax_payments::Entity::find().filter(tax_payments::Column::CreatedAt.gte(since)),
        )
        .await
    }

    async fn total_by_tax_type(
        &self,
        tax_type: TaxType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MinorUnits, RepositoryError> {
        let payments = self
            .payments(
                tax_payments::Entity::find()
                    .filter(tax_payments::Column::TaxType.eq(tax_type.as_str()))
                    .filter(tax_payments::Column::Status.eq(PaymentStatus::Completed.as_str()))
                    .filter(tax_payments::Column::PaymentDate.between(start, end)),
            )
            .await?;
        Ok(payments
            .iter()
            .fold(0, |total: MinorUnits, p| total.saturating_add(p.amount)))
    }

    async fn create(&self, payment: &TaxPayment) -> Result<(), RepositoryError> {
        tax_payments::ActiveModel::from(payment)
            .insert(&self.db)
            .await
            .map_err(|e| {
                write_err(e, "tax payment", "confirmation_code", &payment.confirmation_code)
            })?;
        Ok(())
    }

    async fn update(&self, payment: &TaxPayment) -> Result<TaxPayment, RepositoryError> {
        let mut stored = payment.clone();
        stored.version += 1;

        let result = tax_payments::Entity::update_many()
            .set(tax_payments::ActiveModel::from(&stored))
            .filter(tax_payments::Column::Id.eq(payment.id.into_inner()))
            .filter(tax_payments::Column::Version.eq(payment.version))
            .exec(&self.db)
            .await
            .map_err(|e| {
                write_err(e, "tax payment", "confirmation_code", &payment.confirmation_code)
            })?;

        if result.rows_affected == 0 {
            let exists = tax_payments::Entity::find_by_id(payment.id.into_inner())
                .one(&self.db)
                .await
                .map_err(storage)?
                .is_some();
            return Err(stale_or_missing(exists, "tax payment", payment.id));
        }
        Ok(stored)
    }
}
