//! Repository abstractions for data access.
//!
//! Repositories borrow a connection or a transaction so that a whole entity
//! batch can share one transaction.

pub mod category;
pub mod company;
pub mod invoice;
pub mod product;

pub use category::CategoryRepository;
pub use company::CompanyRepository;
pub use invoice::InvoiceRepository;
pub use product::ProductRepository;
