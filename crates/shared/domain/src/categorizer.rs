//! Transaction categorization rule engine.
//!
//! A user's rules are compiled once into a [`RuleSet`], evaluated in
//! `(priority, created_at, id)` order, and the first match wins. Rules that
//! cannot be compiled are skipped and reported; they never fail the batch.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use uuid::Uuid;

use crate::constants::MAX_RULE_PATTERN_SIZE;
use crate::error::{DomainError, DomainResult};
use crate::rule::UserCategoryRule;
use crate::transaction::Transaction;

/// How a compiled rule tests the match field
#[derive(Debug, Clone)]
enum Matcher {
    /// Lower-cased literal, matched as a case-insensitive substring
    Literal(String),
    Pattern(Regex),
}

impl Matcher {
    fn is_match(&self, field: &str) -> bool {
        match self {
            Matcher::Literal(needle) => field.to_lowercase().contains(needle.as_str()),
            Matcher::Pattern(regex) => regex.is_match(field),
        }
    }
}

/// A rule ready for evaluation
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule_id: Uuid,
    pub category: String,
    pub priority: i32,
    matcher: Matcher,
}

impl CompiledRule {
    /// Check if this rule matches the transaction
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.matcher.is_match(transaction.match_field())
    }
}

/// A rule that could not be compiled, with the reason
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRule {
    pub rule_id: Uuid,
    pub reason: String,
}

/// Per-rule compilation outcome
#[derive(Debug, Clone)]
pub enum RuleCompilation {
    Ready(CompiledRule),
    Skipped(SkippedRule),
}

impl RuleCompilation {
    /// Compile a single rule. Never fails; unusable rules become `Skipped`.
    pub fn compile(rule: &UserCategoryRule) -> Self {
        match build_matcher(rule) {
            Ok(matcher) => RuleCompilation::Ready(CompiledRule {
                rule_id: rule.id,
                category: rule.category.clone(),
                priority: rule.priority,
                matcher,
            }),
            Err(err) => {
                tracing::warn!(
                    rule_id = %rule.id,
                    user_id = %rule.user_id,
                    pattern = %rule.merchant,
                    error = %err,
                    "Skipping categorization rule"
                );
                RuleCompilation::Skipped(SkippedRule {
                    rule_id: rule.id,
                    reason: err.to_string(),
                })
            }
        }
    }
}

/// Compile a regex rule pattern with a bounded compiled size.
pub(crate) fn build_pattern(pattern: &str) -> DomainResult<Regex> {
    RegexBuilder::new(pattern)
        .size_limit(MAX_RULE_PATTERN_SIZE)
        .build()
        .map_err(|e| DomainError::rule_configuration(format!("invalid pattern {:?}: {}", pattern, e)))
}

fn build_matcher(rule: &UserCategoryRule) -> DomainResult<Matcher> {
    if rule.category.trim().is_empty() {
        return Err(DomainError::rule_configuration("category is empty"));
    }
    if rule.is_regex {
        return build_pattern(&rule.merchant).map(Matcher::Pattern);
    }

    let literal = rule.merchant.trim().to_lowercase();
    if literal.is_empty() {
        return Err(DomainError::rule_configuration("merchant pattern is empty"));
    }
    Ok(Matcher::Literal(literal))
}

/// The rule that categorized a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Categorization {
    pub rule_id: Uuid,
    pub category: String,
}

/// A pending write of `primary_category` for one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryChange {
    pub transaction_id: Uuid,
    pub previous: Option<String>,
    pub category: String,
    /// None when the fallback label was applied
    pub rule_id: Option<Uuid>,
}

/// A user's rules in evaluation order
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    skipped: Vec<SkippedRule>,
}

impl RuleSet {
    /// Sort and compile rules. The input is only borrowed.
    pub fn compile(rules: &[UserCategoryRule]) -> Self {
        let mut ordered: Vec<&UserCategoryRule> = rules.iter().collect();
        ordered.sort_by(|a, b| a.evaluation_order(b));

        let mut set = RuleSet::default();
        for rule in ordered {
            match RuleCompilation::compile(rule) {
                RuleCompilation::Ready(compiled) => set.rules.push(compiled),
                RuleCompilation::Skipped(skipped) => set.skipped.push(skipped),
            }
        }
        set
    }

    /// Compiled rules in evaluation order
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Rules that were dropped as misconfigured
    pub fn skipped(&self) -> &[SkippedRule] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First matching rule's category, or None.
    pub fn categorize(&self, transaction: &Transaction) -> Option<Categorization> {
        self.rules
            .iter()
            .find(|rule| rule.matches(transaction))
            .map(|rule| Categorization {
                rule_id: rule.rule_id,
                category: rule.category.clone(),
            })
    }

    /// Change needed for one transaction, if any.
    ///
    /// A match that differs from the current `primary_category` overwrites it.
    /// With no match the current category is kept; `fallback` is applied only
    /// when the transaction has no category at all.
    pub fn change_for(
        &self,
        transaction: &Transaction,
        fallback: Option<&str>,
    ) -> Option<CategoryChange> {
        let current = transaction.category();
        let (category, rule_id) = match self.categorize(transaction) {
            Some(hit) => (hit.category, Some(hit.rule_id)),
            None => match (current, fallback) {
                (None, Some(label)) => (label.to_string(), None),
                _ => return None,
            },
        };

        if current == Some(category.as_str()) {
            return None;
        }

        Some(CategoryChange {
            transaction_id: transaction.id,
            previous: current.map(String::from),
            category,
            rule_id,
        })
    }

    /// Changes needed across a batch of transactions.
    pub fn plan(&self, transactions: &[Transaction], fallback: Option<&str>) -> Vec<CategoryChange> {
        transactions
            .iter()
            .filter_map(|txn| self.change_for(txn, fallback))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UNCATEGORIZED;
    use chrono::{Duration, NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn rule(merchant: &str, category: &str, is_regex: bool, priority: i32) -> UserCategoryRule {
        let now = Utc::now();
        UserCategoryRule {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            merchant: merchant.into(),
            category: category.into(),
            is_regex,
            priority,
            created_at: now,
            updated_at: now,
        }
    }

    fn txn(merchant: Option<&str>, name: &str) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            account_id: Uuid::new_v4(),
            amount: dec!(5.75),
            date: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
            name: name.into(),
            merchant_name: merchant.map(String::from),
            pending: false,
            primary_category: None,
            detailed_category: Some("FOOD_AND_DRINK_COFFEE".into()),
            categories: vec!["Food and Drink".into()],
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn starbucks_rules() -> Vec<UserCategoryRule> {
        vec![
            rule("^Star.*", "Retail", true, 2),
            rule("Starbucks", "Coffee", false, 1),
        ]
    }

    #[test]
    fn test_lower_priority_wins_when_both_match() {
        let set = RuleSet::compile(&starbucks_rules());
        let hit = set.categorize(&txn(Some("Starbucks #221"), "STARBUCKS")).unwrap();
        assert_eq!(hit.category, "Coffee");
    }

    #[test]
    fn test_regex_rule_matches() {
        let set = RuleSet::compile(&[rule("^Star.*", "Retail", true, 2)]);
        let hit = set.categorize(&txn(Some("Starlight Mall"), "POS 1182")).unwrap();
        assert_eq!(hit.category, "Retail");
    }

    #[test]
    fn test_invalid_regex_is_skipped_not_thrown() {
        let bad = rule("(invalid", "Broken", true, 1);
        let set = RuleSet::compile(std::slice::from_ref(&bad));

        assert!(set.categorize(&txn(Some("(invalid"), "x")).is_none());
        assert_eq!(set.skipped().len(), 1);
        assert_eq!(set.skipped()[0].rule_id, bad.id);
        assert!(set.is_empty());
    }

    #[test]
    fn test_invalid_regex_does_not_block_other_rules() {
        let rules = vec![
            rule("(invalid", "Broken", true, 0),
            rule("market", "Groceries", false, 5),
        ];
        let set = RuleSet::compile(&rules);
        let hit = set.categorize(&txn(Some("Whole Foods Market"), "WFM")).unwrap();
        assert_eq!(hit.category, "Groceries");
        assert_eq!(set.rules().len(), 1);
    }

    #[test]
    fn test_literal_match_is_case_insensitive_substring() {
        let set = RuleSet::compile(&[rule("  STARBUCKS ", "Coffee", false, 1)]);
        assert!(set.categorize(&txn(Some("starbucks #221"), "x")).is_some());
        assert!(set.categorize(&txn(Some("Peet's"), "x")).is_none());
    }

    #[test]
    fn test_regex_is_case_sensitive_as_written() {
        let set = RuleSet::compile(&[rule("^star", "Retail", true, 1)]);
        assert!(set.categorize(&txn(Some("Starlight Mall"), "x")).is_none());

        let opt_in = RuleSet::compile(&[rule("(?i)^star", "Retail", true, 1)]);
        assert!(opt_in.categorize(&txn(Some("Starlight Mall"), "x")).is_some());
    }

    #[test]
    fn test_falls_back_to_transaction_name() {
        let set = RuleSet::compile(&[rule("uber", "Rides", false, 1)]);
        let hit = set.categorize(&txn(None, "UBER *TRIP HELP.UBER.COM")).unwrap();
        assert_eq!(hit.category, "Rides");
    }

    #[test]
    fn test_regex_falls_back_to_transaction_name() {
        let set = RuleSet::compile(&[rule(r"^SQ \*STAR", "Coffee", true, 1)]);

        let hit = set.categorize(&txn(None, "SQ *STARBUCKS 221")).unwrap();
        assert_eq!(hit.category, "Coffee");
        assert!(set.categorize(&txn(Some("Starbucks"), "SQ *STARBUCKS 221")).is_none());
    }

    #[test]
    fn test_priority_tie_broken_by_creation_order() {
        let mut first = rule("coffee", "First", false, 3);
        let mut second = rule("coffee", "Second", false, 3);
        first.created_at = Utc::now() - Duration::hours(1);
        second.created_at = Utc::now();

        // Storage order must not matter.
        let set = RuleSet::compile(&[second, first]);
        let hit = set.categorize(&txn(Some("Blue Bottle Coffee"), "x")).unwrap();
        assert_eq!(hit.category, "First");
    }

    #[test]
    fn test_empty_literal_is_skipped() {
        let set = RuleSet::compile(&[rule("   ", "Everything", false, 1)]);
        assert!(set.categorize(&txn(Some("Anything"), "x")).is_none());
        assert_eq!(set.skipped().len(), 1);
    }

    #[test]
    fn test_categorize_is_idempotent() {
        let set = RuleSet::compile(&starbucks_rules());
        let t = txn(Some("Starbucks #221"), "STARBUCKS");
        assert_eq!(set.categorize(&t), set.categorize(&t));
    }

    #[test]
    fn test_compile_does_not_mutate_rules() {
        let rules = starbucks_rules();
        let before = rules.clone();
        let _ = RuleSet::compile(&rules);
        assert_eq!(rules, before);
    }

    #[test]
    fn test_plan_only_includes_changes() {
        let set = RuleSet::compile(&starbucks_rules());
        let mut already = txn(Some("Starbucks #9"), "x");
        already.primary_category = Some("Coffee".into());
        let fresh = txn(Some("Starbucks #221"), "x");
        let unmatched = txn(Some("Shell Oil"), "x");

        let plan = set.plan(&[already, fresh.clone(), unmatched], None);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].transaction_id, fresh.id);
        assert_eq!(plan[0].category, "Coffee");
        assert_eq!(plan[0].previous, None);
    }

    #[test]
    fn test_applying_plan_then_replanning_is_empty() {
        let set = RuleSet::compile(&starbucks_rules());
        let mut txns = vec![txn(Some("Starbucks #221"), "x"), txn(Some("Starlight"), "x")];

        for change in set.plan(&txns, Some(UNCATEGORIZED)) {
            let t = txns.iter_mut().find(|t| t.id == change.transaction_id).unwrap();
            t.primary_category = Some(change.category);
        }

        assert!(set.plan(&txns, Some(UNCATEGORIZED)).is_empty());
    }

    #[test]
    fn test_no_match_keeps_prior_category() {
        let set = RuleSet::compile(&starbucks_rules());
        let mut t = txn(Some("Shell Oil"), "x");
        t.primary_category = Some("Gas".into());
        assert_eq!(set.change_for(&t, Some(UNCATEGORIZED)), None);
    }

    #[test]
    fn test_fallback_applies_only_to_uncategorized() {
        let set = RuleSet::compile(&starbucks_rules());
        let change = set.change_for(&txn(Some("Shell Oil"), "x"), Some(UNCATEGORIZED)).unwrap();
        assert_eq!(change.category, UNCATEGORIZED);
        assert_eq!(change.rule_id, None);
    }

    #[test]
    fn test_rule_overrides_bank_category_fields_untouched() {
        let set = RuleSet::compile(&starbucks_rules());
        let mut t = txn(Some("Starbucks #221"), "x");
        t.primary_category = Some("FOOD_AND_DRINK".into());

        let change = set.change_for(&t, None).unwrap();
        assert_eq!(change.previous.as_deref(), Some("FOOD_AND_DRINK"));
        assert_eq!(change.category, "Coffee");
        assert_eq!(t.detailed_category.as_deref(), Some("FOOD_AND_DRINK_COFFEE"));
    }
}
