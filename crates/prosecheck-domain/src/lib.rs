//! Domain logic: the check engine.
//!
//! This crate is I/O-free: rule specs come in as YAML text, blocks come in
//! from the extractors, and alerts come out. Everything here is exercised
//! by the dispatcher in `prosecheck-core`.

pub mod alert;
pub mod block;
pub mod compile;
pub mod context;
pub mod directives;
pub mod dispatch;
pub mod matchers;
pub mod pos;
pub mod registry;
pub mod selector;

pub use alert::{format_message, make_alert};
pub use block::Block;
pub use compile::{compile_rule, parse_rule, CompiledRules, RuleError};
pub use context::FileContext;
pub use directives::{parse_directive, Directive, DirectiveIndex};
pub use dispatch::{lint_block, DispatchSettings};
pub use matchers::{BoundCheck, CasePredicate, CompiledCheck, Matcher, TitleStyle};
pub use pos::{NullPosOracle, PosOracle};
pub use registry::{LoadDiagnostic, Registry};
pub use selector::Selector;
