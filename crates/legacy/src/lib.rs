//! Legacy Access databases read over ODBC.
//!
//! Each configured `.mdb`/`.accdb` file is opened through the configured
//! ODBC driver (`Microsoft Access Driver` on Windows, `MDBTools` elsewhere)
//! and exposed as a [`nucleus_core::LegacySource`].

mod decode;
mod odbc;

pub use decode::decode_cell;
pub use odbc::{OdbcProvider, OdbcSource, connection_string, quote_identifier};
