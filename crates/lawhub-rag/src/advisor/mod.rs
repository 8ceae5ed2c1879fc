//! Static rule-based legal advice, the last stage of the fallback chain

pub mod country;
pub mod rules;

pub use country::{detect_country, supported_countries, COUNTRY_KEYWORDS};
pub use rules::{Advisor, IssueKind, RuleBasedAdvisor};
