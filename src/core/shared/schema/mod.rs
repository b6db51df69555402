pub mod crm;
pub mod operations;

pub use self::crm::*;
pub use self::operations::*;

diesel::allow_tables_to_appear_in_same_query!(companies, contacts, opportunities, employees, tasks,);
