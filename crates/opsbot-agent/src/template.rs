//! Prompt templates with named `{slot}` markers.
//!
//! All slots are filled in one pass over the template, so text inserted for
//! one slot is never scanned for another. Markers with no matching slot
//! (including the `{{step_N}}` examples inside the prompts) are left alone.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("slot regex is valid"));

/// Fill `template`'s `{name}` markers from `slots`.
pub(crate) fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    SLOT.replace_all(template, |caps: &Captures| {
        slots
            .iter()
            .find(|(name, _)| *name == &caps[1])
            .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
    })
    .into_owned()
}
