//! Rule extraction for interpretability.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    Polarity,
    model::{AutomataModel, ClauseModel}
};

/// # Overview
///
/// A conjunction read off a trained clause:
/// `(x[i1] AND x[i2] AND NOT x[j1])`.
///
/// `strength` is the summed weight of the included literals; a larger
/// value means the clause has been reinforced more often.
///
/// # Examples
///
/// ```
/// use granular_tsetlin::{ClauseModel, Polarity, Rule};
///
/// let model = ClauseModel { no: 0, literals: vec![5, -3, -2, 1] };
/// let rule = Rule::from_model(&model, Polarity::Positive);
///
/// assert_eq!(rule.included, vec![0]);
/// assert_eq!(rule.negated, vec![1]);
/// assert_eq!(rule.to_string(), "+ (x[0] AND NOT x[1])");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rule {
    pub no:       usize,
    pub included: Vec<usize>,
    pub negated:  Vec<usize>,
    pub polarity: Polarity,
    pub strength: i64
}

impl Rule {
    /// # Overview
    ///
    /// Lists the literals of `model` whose weight is `>= 0`.
    #[must_use]
    pub fn from_model(model: &ClauseModel, polarity: Polarity) -> Self {
        let mut strength = 0i64;
        let mut pick = |weights: &[i32]| -> Vec<usize> {
            weights
                .iter()
                .enumerate()
                .filter(|(_, w)| **w >= 0)
                .map(|(k, &w)| {
                    strength += i64::from(w);
                    k
                })
                .collect()
        };
        let included = pick(model.positive());
        let negated = pick(model.negative());

        Self {
            no: model.no,
            included,
            negated,
            polarity,
            strength
        }
    }

    /// # Overview
    ///
    /// Rule with no literals; it matches everything.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.negated.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn complexity(&self) -> usize {
        self.included.len() + self.negated.len()
    }

    /// # Overview
    ///
    /// True when some `x_k` appears both plainly and negated, so the rule can
    /// never match.
    #[must_use]
    pub fn is_contradictory(&self) -> bool {
        self.included.iter().any(|k| self.negated.binary_search(k).is_ok())
    }

    /// # Overview
    ///
    /// Evaluates the conjunction on an unpacked 0/1 row.
    #[must_use]
    pub fn matches(&self, x: &[u8]) -> bool {
        self.included.iter().all(|&k| x.get(k).is_some_and(|&v| v > 0))
            && self.negated.iter().all(|&k| x.get(k).is_some_and(|&v| v == 0))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.polarity {
            Polarity::Positive => '+',
            Polarity::Negative => '-'
        };
        if self.is_empty() {
            return write!(f, "{sign} TRUE");
        }

        let parts: Vec<String> = self
            .included
            .iter()
            .map(|k| format!("x[{k}]"))
            .chain(self.negated.iter().map(|k| format!("NOT x[{k}]")))
            .collect();
        write!(f, "{sign} ({})", parts.join(" AND "))
    }
}

/// # Overview
///
/// Satisfiable rules of one class, strongest first.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatternReport {
    pub class:    usize,
    pub tag:      String,
    pub positive: Vec<Rule>,
    pub negative: Vec<Rule>
}

impl PatternReport {
    /// # Overview
    ///
    /// Extracts every clause of `model`, dropping contradictory rules.
    #[must_use]
    pub fn from_model(model: &AutomataModel, tag: impl Into<String>) -> Self {
        Self {
            class:    model.no,
            tag:      tag.into(),
            positive: collect_rules(&model.positive_clauses, Polarity::Positive),
            negative: collect_rules(&model.negative_clauses, Polarity::Negative)
        }
    }

    /// # Overview
    ///
    /// All kept rules, positive first.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.positive.iter().chain(&self.negative)
    }
}

fn collect_rules(clauses: &[ClauseModel], polarity: Polarity) -> Vec<Rule> {
    let mut rules: Vec<Rule> = clauses
        .iter()
        .map(|c| Rule::from_model(c, polarity))
        .filter(|r| !r.is_contradictory())
        .collect();
    rules.sort_by(|a, b| b.strength.cmp(&a.strength).then(a.no.cmp(&b.no)));
    rules
}

impl fmt::Display for PatternReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.tag)?;
        for rule in self.rules() {
            writeln!(f, "  {rule}  [{}]", rule.strength)?;
        }
        Ok(())
    }
}
