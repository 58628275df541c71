use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ServiceId);
id_newtype!(CategoryId);
id_newtype!(OrderId);
id_newtype!(UserId);

/// Branded service tier. The tier names are product vocabulary and are kept
/// verbatim on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Plata,
    Oro,
    Diamante,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Plata => "plata",
            Classification::Oro => "oro",
            Classification::Diamante => "diamante",
        }
    }

    /// Bootstrap badge class used by catalog views.
    pub fn badge_class(&self) -> &'static str {
        match self {
            Classification::Plata => "bg-secondary",
            Classification::Oro => "bg-warning",
            Classification::Diamante => "bg-info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Approved,
    Cancelled,
    Completed,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Approved => "approved",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Client,
    Company,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Client => "client",
            Role::Company => "company",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub price: f64,
    pub image_url: String,
    pub classification: Classification,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub service_id: ServiceId,
    pub placed_at: DateTime<Utc>,
    pub event_date: NaiveDate,
    pub total_price: f64,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Hex SHA-256 digest. Absent in representations that redact credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub role: Role,
    pub phone: String,
    pub registered_at: DateTime<Utc>,
    pub active: bool,
}
