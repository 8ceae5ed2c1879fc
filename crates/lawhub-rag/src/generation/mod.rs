//! Answer synthesis, template guard and citation footers

pub mod citation;
pub mod guard;
pub mod prompt;
pub mod synthesizer;

pub use citation::{collect_sources, sources_footer, unique_pages, with_footers, LEGAL_DISCLAIMER};
pub use guard::is_degenerate;
pub use prompt::PromptBuilder;
pub use synthesizer::{SynthesisMode, SynthesisSettings, Synthesizer};
