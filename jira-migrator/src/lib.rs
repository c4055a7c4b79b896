#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod comments;
pub mod config;
pub mod export;
pub mod gateway;
pub mod issues;
pub mod labels;
pub mod ledger;
pub mod milestones;
pub mod rate_limit;
pub mod references;
pub mod relationships;
pub mod runner;
pub mod summary;

pub use comments::{resolve_all, PostProcessError, PostProcessReport};
pub use config::{load_settings, ConfigError, Settings};
pub use export::{load_snapshot, ExportError, Issue, ProjectSnapshot, RelationshipKind};
pub use gateway::{GatewayError, GitHubClient, GitHubGateway, InMemoryGateway};
pub use issues::{
    import_issues, Backoff, FailurePolicy, ImportError, ImportOptions, ImportReport,
    IssueFailure, IssueState, PollPolicy,
};
pub use labels::{sync_labels, ColourSelector, LabelError, LabelSummary, PaletteColourSelector};
pub use ledger::{ImportLedger, LedgerEntry, LedgerError};
pub use milestones::{sync_milestones, MilestoneError, MilestoneMap};
pub use rate_limit::{check_core_rate_limit, ensure_core_rate_limit, wait_if_needed, RateLimitInfo};
pub use references::{IdMap, PlaceholderResolver, ReferenceEncoder, Resolution};
pub use relationships::materialize_relationships;
pub use runner::{Runner, RunnerConfig, RunnerError, Stage};
pub use summary::RunSummary;
