//! The per-block dispatch predicate.
//!
//! For each block the registry is walked in map order. A rule runs iff:
//!
//! 1. its severity is at or above the configured minimum,
//! 2. the block's scope satisfies the rule's scope,
//! 3. no in-text directive disables it at the block's line,
//! 4. the text it would evaluate is non-empty, and
//! 5. the enablement overlay resolves to "on": per-syntax override first,
//!    then the global override, then membership of the rule's style in the
//!    file's base styles.

use std::collections::BTreeMap;

use prosecheck_types::AlertLevel;

use crate::block::Block;
use crate::context::FileContext;
use crate::pos::PosOracle;
use crate::registry::Registry;

/// Dispatch-time configuration shared by every file.
#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings<'a> {
    pub min_level: AlertLevel,
    /// Per-rule on/off overrides that apply to every file.
    pub global_checks: &'a BTreeMap<String, bool>,
}

/// Formats whose cleaned text can differ from the raw text; `code: true`
/// rules get the raw form there.
fn carries_code(normed_ext: &str) -> bool {
    matches!(normed_ext, ".md" | ".adoc" | ".rst")
}

/// Run every applicable rule against one block, appending alerts to the
/// file in evaluation order.
pub fn lint_block(
    registry: &Registry,
    settings: &DispatchSettings<'_>,
    ctx: &mut FileContext,
    block: &Block,
    oracle: &dyn PosOracle,
) {
    let has_code = carries_code(&ctx.normed_ext);

    for (_key, bound) in registry.checks() {
        let chk = &bound.check;

        let txt = if chk.code && has_code {
            block.raw.as_str()
        } else {
            block.text.as_str()
        };
        if txt.is_empty() || ctx.directives.disabled(&chk.name, block.line) {
            continue;
        }
        if chk.level < settings.min_level || !block.scope.contains(&chk.scope) {
            continue;
        }

        // Per-syntax override, then global override, then base styles.
        let mut run = false;
        if let Some(&enabled) = ctx.checks.get(&chk.name) {
            if !enabled {
                continue;
            }
            run = true;
        }
        if !run {
            if let Some(&enabled) = settings.global_checks.get(&chk.name) {
                if !enabled {
                    continue;
                }
                run = true;
            }
        }
        if !run && !ctx.base_styles.iter().any(|s| s == chk.style()) {
            continue;
        }

        for alert in bound.evaluate(txt, ctx, oracle) {
            ctx.add_alert(alert, block.line, block.pad, txt);
        }
    }
}
