//! Logical-structure review for bulleted outlines.
//!
//! The checker reads a document's paragraphs, rebuilds the
//! Summary → Message → Body hierarchy, submits it to an evaluation service,
//! and maps the returned findings back onto the live document as highlights
//! and comments.
//!
//! ```no_run
//! use outline_checker::config::CheckerConfig;
//! use outline_checker::document::MemoryDocument;
//! use outline_checker::gateway::EvaluatorClient;
//! use outline_checker::session::{CheckOutcome, ReviewSession};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = CheckerConfig::load();
//! let client = EvaluatorClient::from_config(&config.evaluator)?;
//! let mut session = ReviewSession::new(client, config);
//!
//! let mut doc = MemoryDocument::from_indented_text("Plan\n• Ship it\n  • This week", 12.0);
//! if let CheckOutcome::Checked(report) = session.check(&mut doc).await? {
//!     println!("{} - {}", report.score, report.tier_message());
//! }
//! # Ok(())
//! # }
//! ```

pub mod annotate;
pub mod config;
pub mod document;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod outline;
pub mod priority;
pub mod session;
pub mod telemetry;

pub use telemetry::init_tracing;
