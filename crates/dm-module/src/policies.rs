//! Policies for folding repeated product elements into a record

use serde::{Deserialize, Serialize};

/// How repeated elements (redshift bins, patches) are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatPolicy {
    /// Keep only the last element seen
    KeepLast,

    /// Keep every element in document order
    #[default]
    CollectAll,
}

impl RepeatPolicy {
    /// Add `item` to `items` according to the policy
    pub fn fold<T>(self, items: &mut Vec<T>, item: T) {
        if self == Self::KeepLast {
            items.clear();
        }
        items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        let mut kept = Vec::new();
        let mut all = Vec::new();
        for i in 0..3 {
            RepeatPolicy::KeepLast.fold(&mut kept, i);
            RepeatPolicy::CollectAll.fold(&mut all, i);
        }
        assert_eq!(kept, vec![2]);
        assert_eq!(all, vec![0, 1, 2]);
    }

    #[test]
    fn test_config_names() {
        let policy: RepeatPolicy = serde_yaml::from_str("keep-last").unwrap();
        assert_eq!(policy, RepeatPolicy::KeepLast);
        assert_eq!(RepeatPolicy::default(), RepeatPolicy::CollectAll);
    }
}
