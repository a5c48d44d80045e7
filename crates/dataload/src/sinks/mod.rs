//! Record sinks shipped with the loading step.

mod local;
mod memory;

pub use local::LocalOrgSink;
pub use memory::MemorySink;

/// Three-character key prefix for an external object.
pub fn key_prefix(sf_object: &str) -> &'static str {
    match sf_object {
        "Account" => "001",
        "Contact" => "003",
        "Opportunity" => "006",
        "Lead" => "00Q",
        "Case" => "500",
        _ => "a00",
    }
}

/// Build an 18-character external id: key prefix, 12-digit counter, `AAA`.
pub fn external_id(sf_object: &str, counter: u64) -> String {
    format!("{}{:012}AAA", key_prefix(sf_object), counter)
}
