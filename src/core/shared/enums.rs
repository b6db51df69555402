//! Domain enums stored as TEXT columns.
//!
//! Each enum maps to an upper-case string both on the wire (serde) and in
//! PostgreSQL (diesel `ToSql`/`FromSql`), so `.eq(Zone::Dock)` works directly
//! in queries and rows load straight into typed fields.

use diesel::deserialize::{self, FromSql};
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};
use std::io::Write;

macro_rules! text_sql_enum {
    ($name:ident) => {
        impl ToSql<Text, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(serialize::IsNull::No)
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let value = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                value.parse::<$name>().map_err(|e| e.into())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ============================================================================
// TASK ZONES
// ============================================================================

/// Workflow position of a task inside its department board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Zone {
    Shelf,
    Storage,
    Dock,
    Active,
}

impl Zone {
    /// Board order.
    pub const ALL: [Zone; 4] = [Zone::Shelf, Zone::Storage, Zone::Dock, Zone::Active];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shelf => "SHELF",
            Self::Storage => "STORAGE",
            Self::Dock => "DOCK",
            Self::Active => "ACTIVE",
        }
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self::Shelf
    }
}

impl std::str::FromStr for Zone {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SHELF" => Ok(Self::Shelf),
            "STORAGE" => Ok(Self::Storage),
            "DOCK" => Ok(Self::Dock),
            "ACTIVE" => Ok(Self::Active),
            _ => Err(format!("Unknown zone: {}", s)),
        }
    }
}

text_sql_enum!(Zone);

// ============================================================================
// DEPARTMENTS
// ============================================================================

/// Organizational unit that owns tasks and employees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    Sales,
    Marketing,
    Operations,
    Development,
    Design,
    Administration,
}

impl Department {
    pub const ALL: [Department; 6] = [
        Department::Sales,
        Department::Marketing,
        Department::Operations,
        Department::Development,
        Department::Design,
        Department::Administration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "SALES",
            Self::Marketing => "MARKETING",
            Self::Operations => "OPERATIONS",
            Self::Development => "DEVELOPMENT",
            Self::Design => "DESIGN",
            Self::Administration => "ADMINISTRATION",
        }
    }
}

impl std::str::FromStr for Department {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SALES" => Ok(Self::Sales),
            "MARKETING" => Ok(Self::Marketing),
            "OPERATIONS" | "OPS" => Ok(Self::Operations),
            "DEVELOPMENT" | "DEV" => Ok(Self::Development),
            "DESIGN" => Ok(Self::Design),
            "ADMINISTRATION" | "ADMIN" => Ok(Self::Administration),
            _ => Err(format!("Unknown department: {}", s)),
        }
    }
}

text_sql_enum!(Department);

// ============================================================================
// OPPORTUNITY STAGES
// ============================================================================

/// Sales pipeline phase of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityStage {
    New,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl OpportunityStage {
    /// Pipeline order.
    pub const ALL: [OpportunityStage; 6] = [
        OpportunityStage::New,
        OpportunityStage::Qualified,
        OpportunityStage::Proposal,
        OpportunityStage::Negotiation,
        OpportunityStage::Won,
        OpportunityStage::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Qualified => "QUALIFIED",
            Self::Proposal => "PROPOSAL",
            Self::Negotiation => "NEGOTIATION",
            Self::Won => "WON",
            Self::Lost => "LOST",
        }
    }

    pub fn default_probability(&self) -> i32 {
        match self {
            Self::New => 10,
            Self::Qualified => 25,
            Self::Proposal => 50,
            Self::Negotiation => 75,
            Self::Won => 100,
            Self::Lost => 0,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for OpportunityStage {
    fn default() -> Self {
        Self::New
    }
}

impl std::str::FromStr for OpportunityStage {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NEW" => Ok(Self::New),
            "QUALIFIED" => Ok(Self::Qualified),
            "PROPOSAL" => Ok(Self::Proposal),
            "NEGOTIATION" => Ok(Self::Negotiation),
            "WON" => Ok(Self::Won),
            "LOST" => Ok(Self::Lost),
            _ => Err(format!("Unknown opportunity stage: {}", s)),
        }
    }
}

text_sql_enum!(OpportunityStage);

// ============================================================================
// TASK PRIORITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "URGENT" => Ok(Self::Urgent),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

text_sql_enum!(TaskPriority);
