//! Progressive YAML repair (spec §4.7): each textual stage only runs if the
//! previous parse attempt still fails. Once the document parses, the
//! schema-level stages (defaulting, placeholder insertion) always run, since
//! a structurally valid document can still be schema-incomplete.

use std::sync::LazyLock;

use context_error::{BoxedError, Context, CreateError};
use regex::Regex;

use crate::defaulting::apply_defaults;
use crate::error::RepairError;

static STRAY_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\\([^"\\/bfnrtu])"#).expect("static regex is valid"));
static TAB_INDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\t+").expect("static regex is valid"));

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RepairStage {
    EscapeSequences,
    QuoteBalancing,
    StructuralIndentation,
    SchemaDefaulting,
    PlaceholderInsertion,
}

impl RepairStage {
    pub const fn name(self) -> &'static str {
        match self {
            Self::EscapeSequences => "escape_sequences",
            Self::QuoteBalancing => "quote_balancing",
            Self::StructuralIndentation => "structural_indentation",
            Self::SchemaDefaulting => "schema_defaulting",
            Self::PlaceholderInsertion => "placeholder_insertion",
        }
    }
}

pub struct RepairOutcome {
    pub value: serde_yaml::Value,
    pub stages_applied: Vec<RepairStage>,
}

/// Run the full repair pipeline against raw Layer-2/3 YAML text.
pub fn repair(raw: &str) -> Result<RepairOutcome, BoxedError<'static, RepairError>> {
    let mut stages_applied = Vec::new();
    let mut text = raw.to_string();

    let mut value = match try_parse(&text) {
        Some(v) => v,
        None => {
            text = fix_escape_sequences(&text);
            stages_applied.push(RepairStage::EscapeSequences);
            match try_parse(&text) {
                Some(v) => v,
                None => {
                    text = balance_quotes(&text);
                    stages_applied.push(RepairStage::QuoteBalancing);
                    match try_parse(&text) {
                        Some(v) => v,
                        None => {
                            text = fix_structure(&text);
                            stages_applied.push(RepairStage::StructuralIndentation);
                            try_parse(&text).ok_or_else(|| {
                                tracing::warn!("all textual repair stages exhausted, document still unparsable");
                                BoxedError::new(
                                    RepairError::Unrepairable,
                                    "all textual repair stages exhausted",
                                    text.clone(),
                                    Context::none(),
                                )
                            })?
                        }
                    }
                }
            }
        }
    };

    apply_defaults(&mut value);
    stages_applied.push(RepairStage::SchemaDefaulting);

    let inserted_placeholder = insert_placeholder_if_empty(&mut value);
    if inserted_placeholder {
        stages_applied.push(RepairStage::PlaceholderInsertion);
    }

    if stages_applied.len() > 2 {
        tracing::debug!(stages = stages_applied.len(), "document required textual repair");
    }

    Ok(RepairOutcome { value, stages_applied })
}

fn try_parse(text: &str) -> Option<serde_yaml::Value> {
    serde_yaml::from_str(text).ok()
}

/// Escape a backslash that does not begin a recognized YAML/JSON escape, the
/// most common cause of Layer-2 files failing to parse (free text copied
/// from a PDF often contains a bare `\` before a digit or letter).
fn fix_escape_sequences(text: &str) -> String {
    STRAY_ESCAPE.replace_all(text, r"\\$1").into_owned()
}

/// Append a closing double quote to any line with an odd count of `"`.
fn balance_quotes(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                return line.to_string();
            }
            let count = line.matches('"').count();
            if count % 2 == 1 {
                format!("{line}\"")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace leading tabs with two-space indentation; YAML forbids tabs for
/// indentation outright.
fn fix_structure(text: &str) -> String {
    TAB_INDENT
        .replace_all(text, |caps: &regex::Captures| "  ".repeat(caps[0].len()))
        .into_owned()
}

fn insert_placeholder_if_empty(value: &mut serde_yaml::Value) -> bool {
    let serde_yaml::Value::Mapping(map) = value else {
        return false;
    };
    let key = serde_yaml::Value::String("ingredients".to_string());
    let is_empty = match map.get(&key) {
        Some(serde_yaml::Value::Sequence(seq)) => seq.is_empty(),
        Some(_) => false,
        None => true,
    };
    if !is_empty {
        return false;
    }
    let placeholder = serde_yaml::to_value(culturemech_core::Ingredient::placeholder())
        .expect("Ingredient serializes");
    map.insert(key, serde_yaml::Value::Sequence(vec![placeholder]));
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixes_stray_backslash_in_double_quoted_scalar() {
        let fixed = fix_escape_sequences(r#"notes: "contains \d digits""#);
        assert!(serde_yaml::from_str::<serde_yaml::Value>(&fixed).is_ok());
    }

    #[test]
    fn balances_unterminated_quote() {
        let fixed = balance_quotes(r#"name: "Marine broth"#);
        assert_eq!(fixed, r#"name: "Marine broth""#);
    }

    #[test]
    fn replaces_tab_indentation() {
        let fixed = fix_structure("a:\n\tb: 1\n");
        assert!(!fixed.contains('\t'));
    }

    #[test]
    fn repairs_quote_imbalance_end_to_end() {
        let raw = "id: X_1_y\nname: \"Marine broth\nsource_db: DSMZ\n";
        let outcome = repair(raw).unwrap();
        assert!(outcome.stages_applied.contains(&RepairStage::QuoteBalancing));
        assert!(outcome.value.is_mapping());
    }

    #[test]
    fn always_runs_defaulting_even_on_first_try_parse() {
        let raw = "id: X_1_y\nname: y\n";
        let outcome = repair(raw).unwrap();
        assert!(!outcome.stages_applied.contains(&RepairStage::EscapeSequences));
        assert!(outcome.stages_applied.contains(&RepairStage::SchemaDefaulting));
    }

    #[test]
    fn inserts_placeholder_ingredient_when_list_empty() {
        let raw = "id: X_1_y\nname: y\ningredients: []\n";
        let outcome = repair(raw).unwrap();
        assert!(outcome.stages_applied.contains(&RepairStage::PlaceholderInsertion));
    }
}
