//! Reference record types
//!
//! Each structure pairs a plain struct with a static descriptor of its
//! layout and indexes. Together they cover every index kind and modifier.

mod financial_transaction;
mod person_number;
mod user_app_connection;
mod wiki;

pub use financial_transaction::{
    FinancialTransaction, FinancialTransactionField, TransactionType,
    FINANCIAL_TRANSACTION_STRUCTURE_ID,
};
pub use person_number::{
    PersonNumber, PersonNumberField, PersonNumberStatus, PERSON_NUMBER_STRUCTURE_ID,
};
pub use user_app_connection::{
    ConnectionStatus, UserAppConnection, UserAppConnectionField, USER_APP_CONNECTION_STRUCTURE_ID,
};
pub use wiki::{Wiki, WikiField, WikiStatus, WIKI_STRUCTURE_ID};

use crate::catalog::{CatalogBuilder, CatalogResult};

/// Registers every reference structure.
pub fn register_all(builder: CatalogBuilder) -> CatalogResult<CatalogBuilder> {
    builder
        .register::<PersonNumber>()?
        .register::<FinancialTransaction>()?
        .register::<UserAppConnection>()?
        .register::<Wiki>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all() {
        let catalog = register_all(CatalogBuilder::new()).unwrap().build();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.name_of(WIKI_STRUCTURE_ID), Some("Wiki"));
        assert!(catalog.ensure_registered::<UserAppConnection>().is_ok());
    }
}
