pub mod assemble;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod keywords;
pub mod parse;
pub mod preprocess;
pub mod resolve;
pub mod text;

pub use assemble::{AllMatches, BestMatch, BlockMatch, MatchResult, ResultShape, SnippetLimit};
#[doc(hidden)]
pub use discovery::{Block, discover, discover_pass};
pub use discovery::{DEFAULT_MAX_BLOCKS_PER_PASS, DiscoveryPolicy};
pub use error::{GleanError, Result};
pub use extract::{DEFAULT_MAX_INPUT_BYTES, Extractor, MatchConfig, MatchConfigBuilder, clean_text, find_matches};
pub use keywords::{CountMode, KeywordCount, KeywordSet};
pub use parse::{Document, Element};
#[doc(hidden)]
pub use preprocess::PreprocessConfig;
pub use preprocess::preprocess_html;
pub use resolve::{DEFAULT_DATE_WINDOW, find_month_date};
pub use text::{TextMode, document_clean_text, normalize};
