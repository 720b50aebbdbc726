//! Label style rule
//!
//! Labels must be `key:value` pairs: exactly one `:`, a key of 1 to 63
//! bytes and a value of at most 63 bytes. Neither part may contain upper
//! case ASCII letters, spaces or ASCII punctuation other than `-` and `_`.
//! The key must not start with a digit, `-` or `_`.

use schemadoc_core::config::LabelStyle;
use schemadoc_core::{Label, RuleCode, Schema, Target, TargetKind, Warning};

use crate::exclude::TableFilter;
use crate::rule::LintRule;

const MAX_PART_LEN: usize = 63;

impl LintRule for LabelStyle {
    fn code(&self) -> RuleCode {
        RuleCode::LabelStyle
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn check(&self, schema: &Schema, exclude: &[String]) -> Vec<Warning> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let mut warnings = Vec::new();

        for label in schema.labels.iter().filter(|l| !is_key_value_style(l)) {
            warnings.push(Warning::new(
                self.code(),
                Target::member(TargetKind::Label, &schema.name, &label.name),
                format!(
                    "required to be in BigQuery `key:value` style. [label `{}` in database `{}`]",
                    label.name, schema.name
                ),
            ));
        }

        let filter = TableFilter::new(schema, exclude, &self.exclude);
        for table in schema.tables.iter().filter(|t| !filter.is_excluded(&t.name)) {
            for label in table.labels.iter().filter(|l| !is_key_value_style(l)) {
                warnings.push(Warning::new(
                    self.code(),
                    Target::member(TargetKind::Label, &table.name, &label.name),
                    format!(
                        "required to be in BigQuery `key:value` style. [label `{}` in table `{}`]",
                        label.name, table.name
                    ),
                ));
            }
        }

        warnings
    }
}

/// Whether a label follows the `key:value` grammar
pub fn is_key_value_style(label: &Label) -> bool {
    let Some((key, value)) = label.key_value() else {
        return false;
    };

    if key.is_empty() || key.len() > MAX_PART_LEN || value.len() > MAX_PART_LEN {
        return false;
    }

    let mut key_chars = key.chars();
    let leading_ok = key_chars
        .next()
        .is_some_and(|c| is_allowed(c) && !c.is_ascii_digit() && c != '-' && c != '_');

    leading_ok && key_chars.all(is_allowed) && value.chars().all(is_allowed)
}

fn is_allowed(c: char) -> bool {
    !(c.is_ascii_uppercase() || c == ' ' || (c.is_ascii_punctuation() && c != '-' && c != '_'))
}
