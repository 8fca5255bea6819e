use std::collections::HashSet;

/// Keys of one mapping node split by which side declares them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPartition<'a> {
    /// Present only in the data, in data order.
    pub data: Vec<&'a str>,
    /// Present only in the rules, in rule order.
    pub rules: Vec<&'a str>,
    /// Present on both sides, in data order.
    pub common: Vec<&'a str>,
}

/// Partition data keys and rule keys into data-only, rule-only and common.
pub fn diff<'a, D, R>(data_keys: D, rule_keys: R) -> KeyPartition<'a>
where
    D: IntoIterator<Item = &'a str>,
    R: IntoIterator<Item = &'a str>,
{
    let data_keys: Vec<&str> = data_keys.into_iter().collect();
    let rule_keys: Vec<&str> = rule_keys.into_iter().collect();
    let data_set: HashSet<&str> = data_keys.iter().copied().collect();
    let rule_set: HashSet<&str> = rule_keys.iter().copied().collect();

    let mut partition = KeyPartition::default();
    for key in data_keys {
        if rule_set.contains(key) {
            partition.common.push(key);
        } else {
            partition.data.push(key);
        }
    }
    partition.rules = rule_keys
        .into_iter()
        .filter(|key| !data_set.contains(key))
        .collect();

    partition
}
