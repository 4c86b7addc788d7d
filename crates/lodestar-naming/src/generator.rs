//! Ordered rule dispatch with per-key memoization
//!
//! A [`Generator`] owns an ordered list of partial rules. The first lookup of a key
//! runs the rules in registration order and caches the first result any of them
//! produces; every later lookup of that key returns the cached value. Rules are not
//! mutually exclusive, so registration order is the precedence order.
//!
//! Rules receive the owning context mutably so they can recurse into the same
//! generator, e.g. a derived class asking for the scope of its supertype. Because
//! the generator usually lives inside that context, [`Generator::get`] reaches it
//! through an accessor instead of borrowing it for the whole lookup.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::error::NamingError;

/// Signature of a rule: `Ok(None)` means "not applicable"
pub type RuleFn<K, V, C> = fn(&mut C, K) -> Result<Option<V>, NamingError>;

/// A named partial function
struct Rule<K, V, C> {
    name: &'static str,
    apply: RuleFn<K, V, C>,
}

impl<K, V, C> Clone for Rule<K, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C> Copy for Rule<K, V, C> {}

impl<K, V, C> fmt::Debug for Rule<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Lazily computed, memoized mapping from keys to values
pub struct Generator<K, V, C> {
    rules: Vec<Rule<K, V, C>>,
    cache: HashMap<K, V>,
    in_progress: HashSet<K>,
}

impl<K, V, C> Default for Generator<K, V, C> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            cache: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }
}

impl<K, V, C> fmt::Debug for Generator<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("rules", &self.rules)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl<K, V, C> Generator<K, V, C>
where
    K: Copy + Eq + Hash + fmt::Debug,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; earlier rules take precedence
    pub fn add_rule(&mut self, name: &'static str, apply: RuleFn<K, V, C>) {
        self.rules.push(Rule { name, apply });
    }

    /// Cached value for `key`, without evaluating any rule
    pub fn cached(&self, key: &K) -> Option<&V> {
        self.cache.get(key)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Look up `key`, evaluating the rules on a miss
    ///
    /// `select` projects the context onto this generator. A failing rule aborts the
    /// lookup and leaves nothing cached for `key`.
    pub fn get(ctx: &mut C, key: K, select: fn(&mut C) -> &mut Self) -> Result<V, NamingError> {
        if let Some(value) = select(ctx).cache.get(&key) {
            return Ok(value.clone());
        }

        if !select(ctx).in_progress.insert(key) {
            return Err(NamingError::Consistency(format!(
                "recursive rule evaluation for {:?}",
                key
            )));
        }

        let result = Self::evaluate(ctx, key, select);
        let generator = select(ctx);
        generator.in_progress.remove(&key);

        let value = result?;
        generator.cache.insert(key, value.clone());
        Ok(value)
    }

    fn evaluate(ctx: &mut C, key: K, select: fn(&mut C) -> &mut Self) -> Result<V, NamingError> {
        let count = select(ctx).rules.len();
        for idx in 0..count {
            let rule = select(ctx).rules[idx];
            if let Some(value) = (rule.apply)(ctx, key)? {
                tracing::trace!("Rule {} produced a value for {:?}", rule.name, key);
                return Ok(value);
            }
        }
        Err(NamingError::NoApplicableRule {
            key: format!("{:?}", key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    /// Context with a generator mapping numbers to shared labels
    #[derive(Default)]
    struct Labels {
        generator: Generator<u32, Rc<String>, Labels>,
        evaluations: usize,
    }

    impl Labels {
        fn generator(&mut self) -> &mut Generator<u32, Rc<String>, Labels> {
            &mut self.generator
        }

        fn get(&mut self, key: u32) -> Result<Rc<String>, NamingError> {
            Generator::get(self, key, Self::generator)
        }
    }

    fn even(ctx: &mut Labels, key: u32) -> Result<Option<Rc<String>>, NamingError> {
        ctx.evaluations += 1;
        Ok((key % 2 == 0).then(|| Rc::new(format!("even {}", key))))
    }

    fn small(ctx: &mut Labels, key: u32) -> Result<Option<Rc<String>>, NamingError> {
        ctx.evaluations += 1;
        Ok((key < 10).then(|| Rc::new(format!("small {}", key))))
    }

    /// Keys above 100 are labelled after the key ten below them
    fn derived(ctx: &mut Labels, key: u32) -> Result<Option<Rc<String>>, NamingError> {
        if key <= 100 {
            return Ok(None);
        }
        let base = ctx.get(key - 10)?;
        Ok(Some(Rc::new(format!("after {}", base))))
    }

    fn failing(_: &mut Labels, key: u32) -> Result<Option<Rc<String>>, NamingError> {
        if key == 13 {
            return Err(NamingError::Consistency("unlucky".to_string()));
        }
        Ok(None)
    }

    fn self_referential(ctx: &mut Labels, key: u32) -> Result<Option<Rc<String>>, NamingError> {
        ctx.get(key).map(Some)
    }

    impl Labels {
        fn rule(mut self, name: &'static str, apply: RuleFn<u32, Rc<String>, Labels>) -> Self {
            self.generator.add_rule(name, apply);
            self
        }
    }

    #[test]
    fn test_first_applicable_rule_wins() {
        let mut ctx = Labels::default().rule("even", even).rule("small", small);
        assert_eq!(ctx.get(4).unwrap().as_str(), "even 4");
        assert_eq!(ctx.get(3).unwrap().as_str(), "small 3");

        let mut reversed = Labels::default().rule("small", small).rule("even", even);
        assert_eq!(reversed.get(4).unwrap().as_str(), "small 4");
    }

    #[test]
    fn test_cached_value_is_same_instance() {
        let mut ctx = Labels::default().rule("even", even);
        let first = ctx.get(8).unwrap();
        let evaluations = ctx.evaluations;
        let second = ctx.get(8).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(ctx.evaluations, evaluations);
        assert_eq!(ctx.generator.cached_len(), 1);
    }

    #[test]
    fn test_no_applicable_rule() {
        let mut ctx = Labels::default().rule("even", even).rule("small", small);
        let err = ctx.get(11).unwrap_err();
        assert!(matches!(err, NamingError::NoApplicableRule { ref key } if key == "11"));
        assert!(ctx.generator.cached(&11).is_none());
    }

    #[test]
    fn test_rules_recurse_into_generator() {
        let mut ctx = Labels::default().rule("derived", derived).rule("even", even);
        let value = ctx.get(112).unwrap();
        assert_eq!(value.as_str(), "after after even 92");
        assert!(Rc::ptr_eq(&ctx.get(102).unwrap(), ctx.generator.cached(&102).unwrap()));
    }

    #[test]
    fn test_failing_rule_caches_nothing() {
        let mut ctx = Labels::default().rule("failing", failing).rule("small", small);
        assert!(ctx.get(13).unwrap_err().is_consistency_failure());
        assert!(ctx.generator.cached(&13).is_none());
        assert_eq!(ctx.get(7).unwrap().as_str(), "small 7");
    }

    #[test]
    fn test_recursive_lookup_of_same_key_is_reported() {
        let mut ctx = Labels::default().rule("self", self_referential);
        let err = ctx.get(1).unwrap_err();
        assert!(err.is_consistency_failure());
        // The guard is released after the failed lookup.
        assert!(ctx.generator.in_progress.is_empty());
    }
}
