mod office;
mod services;

pub use office::{OfficeScene, OFFICE_LABEL};
pub use services::{ServicesScene, DEFAULT_CONTACT, SERVICES};
