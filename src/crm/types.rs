use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::enums::OpportunityStage;
use crate::core::shared::schema::{companies, contacts, opportunities};
use crate::security::validation::Validator;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub stage: Option<String>,
    pub company_id: Option<Uuid>,
}

impl ListQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Substring `ILIKE` pattern. `%`, `_` and `\` in the input match literally.
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)))
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ============================================================================
// COMPANIES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Company {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

impl CreateCompanyRequest {
    pub fn validator(&self) -> Validator {
        Validator::new()
            .string_required(&self.name, "name")
            .max_length(&self.name, "name", 255)
            .optional_email(self.email.as_deref(), "email")
            .optional_url(self.website.as_deref(), "website")
            .optional_phone(self.phone.as_deref(), "phone")
    }

    pub fn into_company(self, organization_id: Uuid) -> Company {
        let now = Utc::now();
        Company {
            id: Uuid::new_v4(),
            organization_id,
            name: self.name.trim().to_string(),
            website: self.website,
            industry: self.industry,
            phone: self.phone,
            email: self.email,
            address: self.address,
            city: self.city,
            country: self.country,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[diesel(table_name = companies)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UpdateCompanyRequest {
    pub fn validator(&self) -> Validator {
        let name = self.name.as_deref();
        Validator::new()
            .custom(|| {
                name.and_then(|n| crate::security::validation::validate_string_required(n, "name").err())
            })
            .max_length(name.unwrap_or_default(), "name", 255)
            .optional_email(self.email.as_deref(), "email")
            .optional_url(self.website.as_deref(), "website")
            .optional_phone(self.phone.as_deref(), "phone")
    }
}

// ============================================================================
// CONTACTS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = contacts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Contact {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub company_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub company_id: Option<Uuid>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub notes: Option<String>,
}

impl CreateContactRequest {
    pub fn validator(&self) -> Validator {
        Validator::new()
            .string_required(&self.first_name, "first_name")
            .max_length(&self.first_name, "first_name", 100)
            .string_required(&self.last_name, "last_name")
            .max_length(&self.last_name, "last_name", 100)
            .optional_email(self.email.as_deref(), "email")
            .optional_phone(self.phone.as_deref(), "phone")
    }

    pub fn into_contact(self, organization_id: Uuid) -> Contact {
        let now = Utc::now();
        Contact {
            id: Uuid::new_v4(),
            organization_id,
            company_id: self.company_id,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email,
            phone: self.phone,
            job_title: self.job_title,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[diesel(table_name = contacts)]
pub struct UpdateContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_id: Option<Uuid>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub notes: Option<String>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UpdateContactRequest {
    pub fn validator(&self) -> Validator {
        use crate::security::validation::validate_string_required;
        let first = self.first_name.as_deref();
        let last = self.last_name.as_deref();
        Validator::new()
            .custom(|| first.and_then(|v| validate_string_required(v, "first_name").err()))
            .custom(|| last.and_then(|v| validate_string_required(v, "last_name").err()))
            .optional_email(self.email.as_deref(), "email")
            .optional_phone(self.phone.as_deref(), "phone")
    }
}

// ============================================================================
// OPPORTUNITIES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = opportunities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Opportunity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub stage: OpportunityStage,
    pub value: f64,
    pub currency: String,
    pub probability: i32,
    pub contact_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub expected_close_date: Option<NaiveDate>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOpportunityRequest {
    pub name: String,
    pub description: Option<String>,
    pub stage: Option<String>,
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub probability: Option<i32>,
    pub contact_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub expected_close_date: Option<NaiveDate>,
}

impl CreateOpportunityRequest {
    pub fn validator(&self) -> Validator {
        Validator::new()
            .string_required(&self.name, "name")
            .max_length(&self.name, "name", 255)
            .non_negative(self.value, "value")
            .range_i32(self.probability, "probability", 0, 100)
            .custom(|| currency_error(self.currency.as_deref()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOpportunityRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stage: Option<String>,
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub probability: Option<i32>,
    pub contact_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub expected_close_date: Option<NaiveDate>,
}

impl UpdateOpportunityRequest {
    pub fn validator(&self) -> Validator {
        use crate::security::validation::validate_string_required;
        let name = self.name.as_deref();
        Validator::new()
            .custom(|| name.and_then(|v| validate_string_required(v, "name").err()))
            .non_negative(self.value, "value")
            .range_i32(self.probability, "probability", 0, 100)
            .custom(|| currency_error(self.currency.as_deref()))
    }
}

/// Column updates for an opportunity. `closed_at: Some(None)` writes NULL.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = opportunities)]
pub struct OpportunityChangeset {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stage: Option<OpportunityStage>,
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub probability: Option<i32>,
    pub contact_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub expected_close_date: Option<NaiveDate>,
    pub closed_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn currency_error(currency: Option<&str>) -> Option<crate::security::validation::ValidationError> {
    let code = currency?;
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        None
    } else {
        Some(crate::security::validation::ValidationError::InvalidValue {
            field: "currency".to_string(),
            message: "must be a three-letter ISO 4217 code".to_string(),
        })
    }
}
