//! Draft records, field enums and validation rules for every editable
//! resource, plus the [`Resource`] bindings that tie entities to drafts.
//! Each rule mapping is an explicit `match` so a missing arm is a compile
//! error rather than a silent string-key miss.

use chrono::NaiveDate;
use serde::Serialize;
use shared::domain::{
    Category, CategoryId, Classification, Order, OrderId, OrderStatus, Role, Service, ServiceId,
    User, UserId,
};

use crate::editor::{
    email_shape, max_length, min_length, min_value, require_some, require_text, FieldError,
    FormModel,
};
use crate::resource::Resource;

pub const CATEGORY_DEFAULT_ICON: &str = "bi-tag";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceField {
    Name,
    Description,
    Category,
    Price,
    Image,
    Classification,
    Active,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDraft {
    pub name: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub price: f64,
    pub image_url: String,
    pub classification: Option<Classification>,
    pub active: bool,
}

impl Default for ServiceDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category_id: None,
            price: 0.0,
            image_url: String::new(),
            classification: None,
            active: true,
        }
    }
}

impl FormModel for ServiceDraft {
    type Field = ServiceField;

    const FIELDS: &'static [ServiceField] = &[
        ServiceField::Name,
        ServiceField::Description,
        ServiceField::Category,
        ServiceField::Price,
        ServiceField::Image,
        ServiceField::Classification,
        ServiceField::Active,
    ];

    fn validate_field(&self, field: ServiceField) -> Result<(), FieldError> {
        match field {
            ServiceField::Name => {
                require_text(&self.name)?;
                max_length(&self.name, 100)
            }
            ServiceField::Description => require_text(&self.description),
            ServiceField::Category => require_some(&self.category_id),
            ServiceField::Price => min_value(self.price, 0.0),
            ServiceField::Image => require_text(&self.image_url),
            ServiceField::Classification => require_some(&self.classification),
            ServiceField::Active => Ok(()),
        }
    }
}

impl Resource for Service {
    type Id = ServiceId;
    type Draft = ServiceDraft;

    const PATH: &'static str = "services";
    const LABEL: &'static str = "service";

    fn id(&self) -> ServiceId {
        self.id
    }

    fn new_draft() -> ServiceDraft {
        ServiceDraft::default()
    }

    fn edit_draft(&self) -> ServiceDraft {
        ServiceDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            category_id: Some(self.category_id),
            price: self.price,
            image_url: self.image_url.clone(),
            classification: Some(self.classification),
            active: self.active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryField {
    Name,
    Description,
    Icon,
    Active,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub active: bool,
}

impl Default for CategoryDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            icon: CATEGORY_DEFAULT_ICON.to_owned(),
            active: true,
        }
    }
}

impl FormModel for CategoryDraft {
    type Field = CategoryField;

    const FIELDS: &'static [CategoryField] = &[
        CategoryField::Name,
        CategoryField::Description,
        CategoryField::Icon,
        CategoryField::Active,
    ];

    fn validate_field(&self, field: CategoryField) -> Result<(), FieldError> {
        match field {
            CategoryField::Name => {
                require_text(&self.name)?;
                max_length(&self.name, 50)
            }
            CategoryField::Description => require_text(&self.description),
            CategoryField::Icon | CategoryField::Active => Ok(()),
        }
    }
}

impl Resource for Category {
    type Id = CategoryId;
    type Draft = CategoryDraft;

    const PATH: &'static str = "categories";
    const LABEL: &'static str = "category";

    fn id(&self) -> CategoryId {
        self.id
    }

    fn new_draft() -> CategoryDraft {
        CategoryDraft::default()
    }

    fn edit_draft(&self) -> CategoryDraft {
        CategoryDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            active: self.active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderField {
    User,
    Service,
    EventDate,
    TotalPrice,
    Status,
    Notes,
    Active,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDraft {
    pub user_id: Option<UserId>,
    pub service_id: Option<ServiceId>,
    pub event_date: Option<NaiveDate>,
    pub total_price: f64,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    pub active: bool,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            user_id: None,
            service_id: None,
            event_date: None,
            total_price: 0.0,
            status: OrderStatus::Pending,
            notes: String::new(),
            active: true,
        }
    }
}

impl FormModel for OrderDraft {
    type Field = OrderField;

    const FIELDS: &'static [OrderField] = &[
        OrderField::User,
        OrderField::Service,
        OrderField::EventDate,
        OrderField::TotalPrice,
        OrderField::Status,
        OrderField::Notes,
        OrderField::Active,
    ];

    fn validate_field(&self, field: OrderField) -> Result<(), FieldError> {
        match field {
            OrderField::User => require_some(&self.user_id),
            OrderField::Service => require_some(&self.service_id),
            OrderField::EventDate => require_some(&self.event_date),
            OrderField::TotalPrice => min_value(self.total_price, 0.0),
            OrderField::Status | OrderField::Notes | OrderField::Active => Ok(()),
        }
    }
}

impl Resource for Order {
    type Id = OrderId;
    type Draft = OrderDraft;

    const PATH: &'static str = "orders";
    const LABEL: &'static str = "order";

    fn id(&self) -> OrderId {
        self.id
    }

    fn new_draft() -> OrderDraft {
        OrderDraft::default()
    }

    fn edit_draft(&self) -> OrderDraft {
        OrderDraft {
            user_id: Some(self.user_id),
            service_id: Some(self.service_id),
            event_date: Some(self.event_date),
            total_price: self.total_price,
            status: self.status,
            notes: self.notes.clone().unwrap_or_default(),
            active: self.active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Name,
    Email,
    Role,
    Phone,
    Active,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
    pub phone: String,
    pub active: bool,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            role: None,
            phone: String::new(),
            active: true,
        }
    }
}

impl FormModel for UserDraft {
    type Field = UserField;

    const FIELDS: &'static [UserField] = &[
        UserField::Name,
        UserField::Email,
        UserField::Role,
        UserField::Phone,
        UserField::Active,
    ];

    fn validate_field(&self, field: UserField) -> Result<(), FieldError> {
        match field {
            UserField::Name => require_text(&self.name),
            UserField::Email => {
                require_text(&self.email)?;
                email_shape(&self.email)
            }
            UserField::Role => require_some(&self.role),
            UserField::Phone | UserField::Active => Ok(()),
        }
    }
}

impl Resource for User {
    type Id = UserId;
    type Draft = UserDraft;

    const PATH: &'static str = "users";
    const LABEL: &'static str = "user";

    fn id(&self) -> UserId {
        self.id
    }

    fn new_draft() -> UserDraft {
        UserDraft::default()
    }

    fn edit_draft(&self) -> UserDraft {
        UserDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            role: Some(self.role),
            phone: self.phone.clone(),
            active: self.active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginField {
    Email,
    Password,
}

/// Credentials form. Never serialized; the password only ever leaves as a
/// digest through the authenticator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl FormModel for LoginForm {
    type Field = LoginField;

    const FIELDS: &'static [LoginField] = &[LoginField::Email, LoginField::Password];

    fn validate_field(&self, field: LoginField) -> Result<(), FieldError> {
        match field {
            LoginField::Email => {
                require_text(&self.email)?;
                email_shape(&self.email)
            }
            LoginField::Password => {
                require_text(&self.password)?;
                min_length(&self.password, 6)
            }
        }
    }
}
