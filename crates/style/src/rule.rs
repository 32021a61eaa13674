//! Rules and styles.

use crate::expression::Expression;
use crate::symbolizer::Symbolizer;
use serde::{Deserialize, Serialize};

/// A set of symbolizers applied within a scale-denominator range, optionally
/// restricted by a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Expression>,
    /// Matches features no other rule of the style matched.
    #[serde(default)]
    pub else_filter: bool,
    pub min_scale: f64,
    pub max_scale: f64,
    pub symbolizers: Vec<Symbolizer>,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: String::new(),
            filter: None,
            else_filter: false,
            min_scale: 0.0,
            max_scale: f64::INFINITY,
            symbolizers: Vec::new(),
        }
    }
}

impl Rule {
    pub fn new(name: &str, title: &str, min_scale: f64, max_scale: f64) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            min_scale,
            max_scale,
            ..Self::default()
        }
    }

    pub fn append(&mut self, symbolizer: impl Into<Symbolizer>) {
        self.symbolizers.push(symbolizer.into());
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Symbolizer> {
        (index < self.symbolizers.len()).then(|| self.symbolizers.remove(index))
    }

    pub fn set_filter(&mut self, filter: Expression) {
        self.filter = Some(filter);
    }

    /// `min_scale <= scale < max_scale`.
    pub fn active(&self, scale: f64) -> bool {
        scale >= self.min_scale && scale < self.max_scale
    }

    pub fn has_scale_range(&self) -> bool {
        self.min_scale > 0.0 || self.max_scale.is_finite()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub rules: Vec<Rule>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn active_rules(&self, scale: f64) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.iter().filter(move |r| r.active(scale))
    }
}
