pub mod category;
pub mod expense;
pub mod expense_summary;
pub mod payment_mode;
pub mod sea_orm_active_enums;
pub mod todo;
pub mod user;
