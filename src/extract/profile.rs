//! Declared layout profiles.
//!
//! A profile names the fields of a form, the order in which currency values
//! appear on it, and how identity values are recognised. Nothing here reads a
//! PDF; extractors feed it tokens and text.

use regex::{Regex, RegexBuilder};

use crate::classify::collapse_whitespace;
use crate::core::model::{FieldRecord, LayoutCheck};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentPolicy {
    /// Fill as many slots as there are tokens.
    Prefix,
    /// Fill nothing unless every slot has a token.
    AllOrNothing,
}

/// Which rendition of the document text an identity rule runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextView {
    /// Whitespace collapsed to single spaces.
    Collapsed,
    /// Text as extracted, line breaks intact.
    Raw,
}

#[derive(Debug, Clone)]
pub struct IdentityRule {
    pub field: &'static str,
    pub pattern: Regex,
    pub view: TextView,
}

impl IdentityRule {
    pub fn new(field: &'static str, pattern: Regex, view: TextView) -> Self {
        Self {
            field,
            pattern,
            view,
        }
    }

    /// Case-insensitive, dot-matches-newline anchor for a literal identity
    /// block such as an employer's name and address.
    pub fn anchor(field: &'static str, pattern: &str) -> Result<Self, ConfigError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|source| ConfigError::Pattern {
                field,
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self::new(field, regex, TextView::Raw))
    }

    /// Capture group 1 when the pattern has one, otherwise the whole match.
    pub fn find(&self, raw: &str, collapsed: &str) -> Option<String> {
        let haystack = match self.view {
            TextView::Collapsed => collapsed,
            TextView::Raw => raw,
        };
        let caps = self.pattern.captures(haystack)?;
        let m = caps.get(1).or_else(|| caps.get(0))?;
        let value = collapse_whitespace(m.as_str());
        (!value.is_empty()).then_some(value)
    }
}

#[derive(Debug, Clone)]
pub struct LayoutProfile {
    pub name: &'static str,
    pub tax_year: u16,
    pub schema: &'static [&'static str],
    pub slots: &'static [&'static str],
    pub policy: AssignmentPolicy,
    pub identity: Vec<IdentityRule>,
}

impl LayoutProfile {
    /// Note recording which layout produced a document's fields.
    pub fn note(&self) -> String {
        format!("Layout profile {} (tax year {})", self.name, self.tax_year)
    }

    pub fn new_record(&self) -> FieldRecord {
        FieldRecord::from_schema(self.schema)
    }

    pub fn with_rule(mut self, rule: IdentityRule) -> Self {
        self.identity.push(rule);
        self
    }

    /// Assigns tokens to slots by position. Reports `Partial` when the
    /// document offered fewer tokens than the profile declares.
    pub fn assign(&self, tokens: &[String], record: &mut FieldRecord) -> LayoutCheck {
        let expected = self.slots.len();
        let found = tokens.len().min(expected);

        let fill = match self.policy {
            AssignmentPolicy::Prefix => found,
            AssignmentPolicy::AllOrNothing if found == expected => expected,
            AssignmentPolicy::AllOrNothing => 0,
        };
        for (slot, token) in self.slots.iter().zip(tokens).take(fill) {
            record.set(slot, token.as_str());
        }

        if found == expected {
            LayoutCheck::Complete
        } else {
            LayoutCheck::Partial { found, expected }
        }
    }

    /// Runs identity rules in order; a later rule for the same field only
    /// fills it if earlier ones found nothing.
    pub fn apply_identity(&self, raw: &str, record: &mut FieldRecord) {
        let collapsed = collapse_whitespace(raw);
        for rule in &self.identity {
            if !record.is_missing(rule.field) {
                continue;
            }
            if let Some(value) = rule.find(raw, &collapsed) {
                record.set(rule.field, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::FieldValue;
    use pretty_assertions::assert_eq;

    const SCHEMA: &[&str] = &["id", "one", "two", "three"];
    const SLOTS: &[&str] = &["one", "two", "three"];

    fn profile(policy: AssignmentPolicy) -> LayoutProfile {
        LayoutProfile {
            name: "test",
            tax_year: 2024,
            schema: SCHEMA,
            slots: SLOTS,
            policy,
            identity: vec![IdentityRule::new(
                "id",
                Regex::new(r"\b\d{2}-\d{7}\b").unwrap(),
                TextView::Collapsed,
            )],
        }
    }

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn prefix_fills_resolvable_slots() {
        let p = profile(AssignmentPolicy::Prefix);
        let mut record = p.new_record();
        let check = p.assign(&tokens(&["1.00", "2.00"]), &mut record);
        assert_eq!(check, LayoutCheck::Partial { found: 2, expected: 3 });
        assert_eq!(record.missing_fields(), vec!["id", "three"]);
    }

    #[test]
    fn extra_tokens_are_ignored() {
        let p = profile(AssignmentPolicy::Prefix);
        let mut record = p.new_record();
        let check = p.assign(&tokens(&["1.00", "2.00", "3.00", "4.00"]), &mut record);
        assert_eq!(check, LayoutCheck::Complete);
        assert_eq!(record.get("three"), Some(&FieldValue::Value("3.00".into())));
    }

    #[test]
    fn all_or_nothing_leaves_short_layouts_missing() {
        let p = profile(AssignmentPolicy::AllOrNothing);
        let mut record = p.new_record();
        let check = p.assign(&tokens(&["1.00", "2.00"]), &mut record);
        assert!(check.is_degraded());
        assert_eq!(record.missing_fields(), SCHEMA.to_vec());
    }

    #[test]
    fn identity_rules_use_collapsed_text() {
        let p = profile(AssignmentPolicy::Prefix);
        let mut record = p.new_record();
        p.apply_identity("EIN\n  12-3456789 \n", &mut record);
        assert_eq!(record.get("id"), Some(&FieldValue::Value("12-3456789".into())));
    }

    #[test]
    fn anchors_span_lines_and_ignore_case() {
        let rule = IdentityRule::anchor("id", r"acme\s+corp.*?springfield,\s*il\s*\d{5}").unwrap();
        let raw = "ACME Corp\n1 Main St\nSpringfield, IL 62701\n";
        assert_eq!(
            rule.find(raw, &collapse_whitespace(raw)),
            Some("ACME Corp 1 Main St Springfield, IL 62701".to_string())
        );
    }

    #[test]
    fn invalid_anchor_is_a_config_error() {
        assert!(matches!(
            IdentityRule::anchor("id", "("),
            Err(ConfigError::Pattern { field: "id", .. })
        ));
    }
}
