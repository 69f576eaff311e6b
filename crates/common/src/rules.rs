//! Validation rule tokens
//!
//! Rules are either string mnemonics (`required`, `max:255`, `in:a,b`) or
//! structured rule objects tagged by `rule`. A field's rules may be written
//! as a single pipe-delimited string or as a list.

use crate::resource::EnumCase;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single validation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rule {
    Token(String),
    Object(RuleObject),
}

impl Rule {
    pub fn token(value: &str) -> Self {
        Rule::Token(value.to_string())
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            Rule::Token(token) => Some(token.as_str()),
            Rule::Object(_) => None,
        }
    }

    pub fn is_token(&self, value: &str) -> bool {
        self.as_token() == Some(value)
    }
}

impl From<&str> for Rule {
    fn from(value: &str) -> Self {
        Rule::token(value)
    }
}

/// Structured validation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleObject {
    Password(PasswordRule),
    Enum {
        name: String,
        cases: Vec<EnumCase>,
        #[serde(default)]
        only: Option<Vec<Value>>,
        #[serde(default)]
        except: Option<Vec<Value>>,
    },
    In {
        values: Vec<Value>,
    },
    DateTimeIso8601,
    JsonBoolean,
    JsonNumber,
    AllowedFilters {
        #[serde(default)]
        allowed: Vec<String>,
    },
    AllowedSort {
        #[serde(default)]
        allowed: Vec<String>,
    },
    AllowedIncludes {
        #[serde(default)]
        allowed: Vec<String>,
    },
    AllowedFieldSets {
        #[serde(default)]
        allowed: Vec<String>,
    },
    NotSupported,
}

/// Password complexity policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRule {
    #[serde(default = "default_password_min")]
    pub min: u64,

    #[serde(default)]
    pub max: Option<u64>,

    #[serde(default)]
    pub mixed_case: bool,

    #[serde(default)]
    pub letters: bool,

    #[serde(default)]
    pub symbols: bool,

    #[serde(default)]
    pub numbers: bool,
}

fn default_password_min() -> u64 {
    8
}

/// Ordered rules of one field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RuleListRepr")]
pub struct RuleList(pub Vec<Rule>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleListRepr {
    Piped(String),
    List(Vec<Rule>),
}

impl From<RuleListRepr> for RuleList {
    fn from(repr: RuleListRepr) -> Self {
        match repr {
            RuleListRepr::Piped(rules) => RuleList::parse(&rules),
            RuleListRepr::List(rules) => RuleList(rules),
        }
    }
}

impl RuleList {
    /// Split a pipe-delimited rule string
    ///
    /// # Examples
    /// ```
    /// use jsonapi_openapi_common::RuleList;
    ///
    /// let rules = RuleList::parse("required|string|max:255");
    /// assert!(rules.contains("required"));
    /// assert_eq!(rules.len(), 3);
    /// ```
    pub fn parse(rules: &str) -> Self {
        RuleList(
            rules
                .split('|')
                .filter(|token| !token.is_empty())
                .map(Rule::token)
                .collect(),
        )
    }

    /// Whether the literal token is present
    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|rule| rule.is_token(token))
    }

    pub fn push(&mut self, rule: Rule) {
        self.0.push(rule);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First structured rule matching the predicate
    pub fn find_object<F>(&self, predicate: F) -> Option<&RuleObject>
    where
        F: Fn(&RuleObject) -> bool,
    {
        self.0.iter().find_map(|rule| match rule {
            Rule::Object(object) if predicate(object) => Some(object),
            _ => None,
        })
    }
}

impl<'a> IntoIterator for &'a RuleList {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Rule> for RuleList {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        RuleList(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_list_from_pipe_string() {
        let rules: RuleList = serde_yaml::from_str("\"required|string|max:255\"").unwrap();
        assert_eq!(
            rules,
            RuleList(vec![
                Rule::token("required"),
                Rule::token("string"),
                Rule::token("max:255")
            ])
        );
    }

    #[test]
    fn test_rule_list_with_objects() {
        let yaml = r#"
- required
- rule: password
  min: 10
  numbers: true
- rule: allowed_sort
  allowed: [title, -title]
"#;
        let rules: RuleList = serde_yaml::from_str(yaml).unwrap();
        assert!(rules.contains("required"));
        assert_eq!(
            rules.0[1],
            Rule::Object(RuleObject::Password(PasswordRule {
                min: 10,
                max: None,
                mixed_case: false,
                letters: false,
                symbols: false,
                numbers: true,
            }))
        );
        assert!(rules
            .find_object(|rule| matches!(rule, RuleObject::AllowedSort { .. }))
            .is_some());
    }

    #[test]
    fn test_unit_rule_objects() {
        let rules: RuleList =
            serde_yaml::from_str("[{rule: not_supported}, {rule: json_boolean}]").unwrap();
        assert_eq!(rules.0[0], Rule::Object(RuleObject::NotSupported));
        assert_eq!(rules.0[1], Rule::Object(RuleObject::JsonBoolean));
    }
}
