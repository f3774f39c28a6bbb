use crate::expression::Expression;

/// Outcomes recorded by a stateful sampler, grouped by the expression that
/// produced them. Keys keep their first insertion order and every key's
/// outcomes only ever grow, until the whole store is cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<(Expression, Vec<bool>)>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    /// Append outcomes under `key`, creating the key when it is new.
    pub(crate) fn append(&mut self, key: &Expression, outcomes: &[bool]) {
        match self.entries.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, recorded)) => recorded.extend_from_slice(outcomes),
            None => self.entries.push((key.clone(), outcomes.to_vec())),
        }
    }

    /// The most recent `count` outcomes of `key`.
    pub(crate) fn latest(&self, key: &Expression, count: usize) -> &[bool] {
        let recorded = self.get(key).unwrap_or_default();
        &recorded[recorded.len().saturating_sub(count)..]
    }

    pub fn get(&self, key: &Expression) -> Option<&[bool]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, recorded)| recorded.as_slice())
    }

    pub fn contains(&self, key: &Expression) -> bool {
        self.get(key).is_some()
    }

    /// Keys with their outcomes, in first insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Expression, &[bool])> {
        self.entries
            .iter()
            .map(|(key, recorded)| (key, recorded.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Expression> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Every recorded outcome, key by key.
    pub fn values(&self) -> impl Iterator<Item = bool> + '_ {
        self.entries.iter().flat_map(|(_, recorded)| recorded.iter().copied())
    }

    /// Amount of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::History;
    use crate::expression::Expression;

    #[test]
    fn test_append_accumulates() {
        // given
        let mut history = History::new();
        let key = Expression::from("1/2");

        // when
        history.append(&key, &[true, false]);
        history.append(&key, &[true]);

        // then
        assert_eq!(history.get(&key), Some(&[true, false, true][..]));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_insertion_order() {
        let mut history = History::new();
        history.append(&Expression::from(0.25), &[false]);
        history.append(&Expression::from("3/7"), &[true]);
        history.append(&Expression::from(0.25), &[true]);

        let keys: Vec<_> = history.keys().cloned().collect();
        assert_eq!(keys, vec![Expression::from(0.25), Expression::from("3/7")]);
        assert_eq!(history.values().collect::<Vec<_>>(), vec![false, true, true]);

        let lengths: Vec<usize> = history.iter().map(|(_, recorded)| recorded.len()).collect();
        assert_eq!(lengths, vec![2, 1]);
    }

    #[test]
    fn test_latest() {
        let mut history = History::new();
        let key = Expression::from(1);
        history.append(&key, &[false, false, true, true]);

        assert_eq!(history.latest(&key, 2), &[true, true]);
        assert_eq!(history.latest(&key, 10), &[false, false, true, true]);
        assert!(history.latest(&Expression::from(0), 2).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut history = History::new();
        history.append(&Expression::from(1), &[true]);

        history.clear();

        assert!(history.is_empty());
        assert!(!history.contains(&Expression::from(1)));
    }
}
