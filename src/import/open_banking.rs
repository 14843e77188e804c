//! Client for the Swiss NextGen open banking API
//!
//! Only the two read endpoints needed to pull booked transactions are used:
//! the account list and an account's transaction list, whose URL is taken
//! from the account's `_links`.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ParsedRow, ParsedTransaction, RowError};
use crate::config::settings::OpenBankingSettings;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{Money, TransactionSource};

/// Prefix of import IDs for API transactions
pub const IMPORT_ID_PREFIX: &str = "nextgen-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsResponse {
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub iban: String,
    pub currency: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "_links")]
    pub links: AccountLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountLinks {
    pub transactions: Href,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Href {
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionsResponse {
    pub transactions: TransactionLists,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLists {
    #[serde(default)]
    pub booked: Vec<BookedTransaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedTransaction {
    pub transaction_id: String,
    pub booking_date: String,
    pub transaction_amount: TransactionAmount,
    #[serde(default)]
    pub creditor_name: Option<String>,
    #[serde(default)]
    pub remittance_information_unstructured: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionAmount {
    pub amount: String,
    pub currency: String,
}

/// Read access to an open banking backend
pub trait OpenBankingApi {
    fn get_accounts(&self) -> SpendwiseResult<AccountsResponse>;

    /// Fetch transactions from an account's `_links.transactions.href`
    fn get_transactions(&self, href: &str) -> SpendwiseResult<TransactionsResponse>;
}

/// Blocking HTTP client
pub struct HttpOpenBankingClient {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpOpenBankingClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &OpenBankingSettings) -> Self {
        Self::new(
            settings.base_url.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The href is appended as given; absolute URLs are used unchanged
    fn url_for(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            format!("{}{}", self.base_url, href)
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, href: &str) -> SpendwiseResult<T> {
        let url = self.url_for(href);
        debug!(%url, "open banking request");

        let response = self
            .agent
            .get(&url)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| SpendwiseError::Api(format!("GET {} failed: {}", url, e)))?;

        response
            .into_json()
            .map_err(|e| SpendwiseError::Api(format!("Invalid response from {}: {}", url, e)))
    }
}

impl OpenBankingApi for HttpOpenBankingClient {
    fn get_accounts(&self) -> SpendwiseResult<AccountsResponse> {
        self.get_json("/v1/accounts")
    }

    fn get_transactions(&self, href: &str) -> SpendwiseResult<TransactionsResponse> {
        self.get_json(href)
    }
}

/// Choose the account to sync: the one with `iban`, or the first one
pub fn select_account<'a>(accounts: &'a [Account], iban: Option<&str>) -> SpendwiseResult<&'a Account> {
    match iban {
        Some(iban) => {
            let wanted = normalize_iban(iban);
            accounts
                .iter()
                .find(|a| normalize_iban(&a.iban) == wanted)
                .ok_or_else(|| SpendwiseError::NotFound {
                    entity_type: "Account",
                    identifier: iban.to_string(),
                })
        }
        None => accounts
            .first()
            .ok_or_else(|| SpendwiseError::Api("No accounts available".into())),
    }
}

fn normalize_iban(iban: &str) -> String {
    iban.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Convert a booked API transaction into a statement row
///
/// `position` is the 1-based index within the response.
pub fn map_booked_transaction(position: usize, booked: &BookedTransaction) -> ParsedRow {
    let date = NaiveDate::parse_from_str(booked.booking_date.trim(), "%Y-%m-%d").map_err(|_| {
        RowError::new(
            position,
            format!("Could not parse booking date: '{}'", booked.booking_date),
        )
    })?;

    let amount = Money::parse(&booked.transaction_amount.amount).map_err(|e| {
        RowError::new(
            position,
            format!(
                "Could not parse amount '{}': {}",
                booked.transaction_amount.amount, e
            ),
        )
    })?;

    let description = non_blank(&booked.remittance_information_unstructured)
        .or_else(|| non_blank(&booked.creditor_name))
        .unwrap_or("");

    let mut parsed = ParsedTransaction::new(
        position,
        date,
        description,
        amount,
        TransactionSource::OpenBanking,
    );
    parsed.import_id = format!("{}{}", IMPORT_ID_PREFIX, booked.transaction_id);
    Ok(parsed)
}

fn non_blank(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.trim().is_empty())
}

/// Fetch and map the booked transactions of the selected account
pub fn fetch_transactions(
    api: &dyn OpenBankingApi,
    iban: Option<&str>,
) -> SpendwiseResult<(Account, Vec<ParsedRow>)> {
    let accounts = api.get_accounts()?.accounts;
    let account = select_account(&accounts, iban)?.clone();

    let response = api.get_transactions(&account.links.transactions.href)?;
    let rows = response
        .transactions
        .booked
        .iter()
        .enumerate()
        .map(|(i, booked)| map_booked_transaction(i + 1, booked))
        .collect();

    Ok((account, rows))
}
