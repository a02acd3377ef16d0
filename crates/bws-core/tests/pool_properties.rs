use std::collections::HashSet;

use bws_core::ItemPool;
use proptest::prelude::*;

proptest! {
    #[test]
    fn pools_keep_first_occurrences(labels in prop::collection::vec("[a-d ]{0,3}", 0..30)) {
        let pool = ItemPool::new(&labels);

        let mut expected: Vec<&str> = Vec::new();
        for label in &labels {
            let label = label.trim();
            if !label.is_empty() && !expected.contains(&label) {
                expected.push(label);
            }
        }
        let kept: Vec<&str> = pool.iter().map(|item| item.as_str()).collect();
        prop_assert_eq!(kept, expected);

        let unique: HashSet<&str> = pool.iter().map(|item| item.as_str()).collect();
        prop_assert_eq!(unique.len(), pool.len());
        for (idx, item) in pool.iter().enumerate() {
            prop_assert_eq!(pool.position(item.as_str()), Some(idx));
        }
    }
}
