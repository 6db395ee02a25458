//! Initial schema: banking and treasury tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(pk(Customers::Id))
                    .col(string(Customers::FirstName))
                    .col(string(Customers::LastName))
                    .col(string(Customers::Email).unique_key())
                    .col(string(Customers::PhoneNumber))
                    .col(string(Customers::Street))
                    .col(string(Customers::City))
                    .col(string(Customers::State))
                    .col(string(Customers::Country))
                    .col(string(Customers::PostalCode))
                    .col(string(Customers::Status))
                    .col(timestamp(Customers::CreatedAt))
                    .col(timestamp(Customers::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk(Accounts::Id))
                    .col(uuid(Accounts::CustomerId))
                    .col(string(Accounts::AccountType))
                    .col(string(Accounts::Status))
                    .col(money(Accounts::Balance))
                    .col(string(Accounts::Currency))
                    .col(string(Accounts::Name))
                    .col(string(Accounts::Number).unique_key())
                    .col(ColumnDef::new(Accounts::Version).big_integer().not_null().default(1))
                    .col(timestamp(Accounts::CreatedAt))
                    .col(timestamp(Accounts::UpdatedAt))
                    .col(timestamp_null(Accounts::ClosedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_customer")
                            .from(Accounts::Table, Accounts::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(pk(Transactions::Id))
                    .col(string(Transactions::TransactionType))
                    .col(string(Transactions::Status))
                    .col(uuid(Transactions::AccountId))
                    .col(uuid_null(Transactions::SourceAccountId))
                    .col(uuid_null(Transactions::TargetAccountId))
                    .col(money(Transactions::Amount))
                    .col(string(Transactions::Currency))
                    .col(text(Transactions::Description))
                    .col(string(Transactions::Reference).unique_key())
                    .col(text(Transactions::Metadata))
                    .col(ColumnDef::new(Transactions::Version).big_integer().not_null().default(1))
                    .col(timestamp(Transactions::CreatedAt))
                    .col(timestamp(Transactions::UpdatedAt))
                    .col(timestamp_null(Transactions::CompletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaxRates::Table)
                    .if_not_exists()
                    .col(pk(TaxRates::Id))
                    .col(string(TaxRates::TaxType))
                    .col(string(TaxRates::Name))
                    .col(text(TaxRates::Description))
                    .col(ColumnDef::new(TaxRates::Rate).double().not_null())
                    .col(string(TaxRates::BracketType))
                    .col(ColumnDef::new(TaxRates::MinAmount).big_integer().null())
                    .col(ColumnDef::new(TaxRates::MaxAmount).big_integer().null())
                    .col(string(TaxRates::Status))
                    .col(ColumnDef::new(TaxRates::Category).string().null())
                    .col(string(TaxRates::JurisdictionCode))
                    .col(ColumnDef::new(TaxRates::EffectiveDate).date().not_null())
                    .col(ColumnDef::new(TaxRates::ExpirationDate).date().null())
                    .col(timestamp(TaxRates::CreatedAt))
                    .col(timestamp(TaxRates::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Taxpayers::Table)
                    .if_not_exists()
                    .col(pk(Taxpayers::Id))
                    .col(string(Taxpayers::TaxpayerType))
                    .col(string(Taxpayers::Status))
                    .col(string(Taxpayers::Name))
                    .col(string(Taxpayers::TaxIdentifier).unique_key())
                    .col(string(Taxpayers::ContactEmail))
                    .col(string(Taxpayers::ContactPhone))
                    .col(string(Taxpayers::Street))
                    .col(string(Taxpayers::City))
                    .col(string(Taxpayers::State))
                    .col(string(Taxpayers::Country))
                    .col(string(Taxpayers::PostalCode))
                    .col(text(Taxpayers::ExemptionCodes))
                    .col(money(Taxpayers::AnnualRevenue))
                    .col(string(Taxpayers::BusinessType))
                    .col(string(Taxpayers::Industry))
                    .col(timestamp(Taxpayers::CreatedAt))
                    .col(timestamp(Taxpayers::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaxFilings::Table)
                    .if_not_exists()
                    .col(pk(TaxFilings::Id))
                    .col(uuid(TaxFilings::TaxpayerId))
                    .col(ColumnDef::new(TaxFilings::TaxYear).integer().not_null())
                    .col(string(TaxFilings::Period))
                    .col(ColumnDef::new(TaxFilings::PeriodStart).date().not_null())
                    .col(ColumnDef::new(TaxFilings::PeriodEnd).date().not_null())
                    .col(string(TaxFilings::FilingType))
                    .col(string(TaxFilings::Status))
                    .col(money(TaxFilings::GrossIncome))
                    .col(money(TaxFilings::TaxableIncome))
                    .col(money(TaxFilings::TotalSales))
                    .col(money(TaxFilings::TaxableAmount))
                    .col(money(TaxFilings::TaxCalculated))
                    .col(money(TaxFilings::TaxPaid))
                    .col(timestamp_null(TaxFilings::SubmissionDate))
                    .col(timestamp_null(TaxFilings::AcceptanceDate))
                    .col(timestamp(TaxFilings::DueDate))
                    .col(text(TaxFilings::Deductions))
                    .col(text(TaxFilings::Credits))
                    .col(text(TaxFilings::Notes))
                    .col(ColumnDef::new(TaxFilings::Version).big_integer().not_null().default(1))
                    .col(timestamp(TaxFilings::CreatedAt))
                    .col(timestamp(TaxFilings::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaxPayments::Table)
                    .if_not_exists()
                    .col(pk(TaxPayments::Id))
                    .col(uuid(TaxPayments::TaxpayerId))
                    .col(uuid_null(TaxPayments::FilingId))
                    .col(string(TaxPayments::TaxType))
                    .col(money(TaxPayments::Amount))
                    .col(string(TaxPayments::PaymentMethod))
                    .col(string(TaxPayments::Status))
                    .col(ColumnDef::new(TaxPayments::PaymentDate).date().not_null())
                    .col(string(TaxPayments::ConfirmationCode).unique_key())
                    .col(text(TaxPayments::Notes))
                    .col(timestamp_null(TaxPayments::ProcessedAt))
                    .col(timestamp_null(TaxPayments::RefundedAt))
                    .col(ColumnDef::new(TaxPayments::Version).big_integer().not_null().default(1))
                    .col(timestamp(TaxPayments::CreatedAt))
                    .col(timestamp(TaxPayments::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        let indexes = [
            index("idx_accounts_customer", Accounts::Table, Accounts::CustomerId),
            index("idx_transactions_account", Transactions::Table, Transactions::AccountId),
            index("idx_tax_rates_jurisdiction", TaxRates::Table, TaxRates::JurisdictionCode),
            index("idx_tax_filings_taxpayer", TaxFilings::Table, TaxFilings::TaxpayerId),
            index("idx_tax_filings_year", TaxFilings::Table, TaxFilings::TaxYear),
            index("idx_tax_payments_taxpayer", TaxPayments::Table, TaxPayments::TaxpayerId),
            index("idx_tax_payments_filing", TaxPayments::Table, TaxPayments::FilingId),
            index("idx_tax_payments_date", TaxPayments::Table, TaxPayments::PaymentDate),
        ];
        for statement in indexes {
            manager.create_index(statement).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaxPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaxFilings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Taxpayers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaxRates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await
    }
}

fn pk(name: impl IntoIden) -> ColumnDef {
    ColumnDef::new(name).uuid().not_null().primary_key().to_owned()
}

fn uuid(name: impl IntoIden) -> ColumnDef {
    ColumnDef::new(name).uuid().not_null().to_owned()
}

fn uuid_null(name: impl IntoIden) -> ColumnDef {
    ColumnDef::new(name).uuid().null().to_owned()
}

fn string(name: impl IntoIden) -> ColumnDef {
    ColumnDef::new(name).string().not_null().to_owned()
}

fn text(name: impl IntoIden) -> ColumnDef {
    ColumnDef::new(name).text().not_null().to_owned()
}

/// Integer minor units.
fn money(name: impl IntoIden) -> ColumnDef {
    ColumnDef::new(name).big_integer().not_null().to_owned()
}

fn timestamp(name: impl IntoIden) -> ColumnDef {
    ColumnDef::new(name)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn timestamp_null(name: impl IntoIden) -> ColumnDef {
    ColumnDef::new(name)
        .timestamp_with_time_zone()
        .null()
        .to_owned()
}

fn index(name: &str, table: impl IntoIden + 'static, column: impl IntoIden) -> IndexCreateStatement {
    Index::create()
        .name(name)
        .table(table)
        .col(column)
        .if_not_exists()
        .to_owned()
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    Street,
    City,
    State,
    Country,
    PostalCode,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    CustomerId,
    AccountType,
    Status,
    Balance,
    Currency,
    Name,
    Number,
    Version,
    CreatedAt,
    UpdatedAt,
    ClosedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    TransactionType,
    Status,
    AccountId,
    SourceAccountId,
    TargetAccountId,
    Amount,
    Currency,
    Description,
    Reference,
    Metadata,
    Version,
    CreatedAt,
    UpdatedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum TaxRates {
    Table,
    Id,
    TaxType,
    Name,
    Description,
    Rate,
    BracketType,
    MinAmount,
    MaxAmount,
    Status,
    Category,
    JurisdictionCode,
    EffectiveDate,
    ExpirationDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Taxpayers {
    Table,
    Id,
    TaxpayerType,
    Status,
    Name,
    TaxIdentifier,
    ContactEmail,
    ContactPhone,
    Street,
    City,
    State,
    Country,
    PostalCode,
    ExemptionCodes,
    AnnualRevenue,
    BusinessType,
    Industry,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TaxFilings {
    Table,
    Id,
    TaxpayerId,
    TaxYear,
    Period,
    PeriodStart,
    PeriodEnd,
    FilingType,
    Status,
    GrossIncome,
    TaxableIncome,
    TotalSales,
    TaxableAmount,
    TaxCalculated,
    TaxPaid,
    SubmissionDate,
    AcceptanceDate,
    DueDate,
    Deductions,
    Credits,
    Notes,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TaxPayments {
    Table,
    Id,
    TaxpayerId,
    FilingId,
    TaxType,
    Amount,
    PaymentMethod,
    Status,
    PaymentDate,
    ConfirmationCode,
    Notes,
    ProcessedAt,
    RefundedAt,
    Version,
    CreatedAt,
    UpdatedAt,
}
