// Certificates module - Retrieval, parsing and expiry checks

pub mod certificate;
pub mod parser;
pub mod retrieval;

pub use certificate::{Certificate, CertificateSettings, RetrievalMode};
pub use parser::ParsedCertificate;
