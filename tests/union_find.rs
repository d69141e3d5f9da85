//! Tests for union_find module

use traceclean::UnionFind;

#[test]
fn test_basic_operations() {
    let mut uf: UnionFind<i32> = UnionFind::new();

    uf.make_set(1);
    uf.make_set(2);
    uf.make_set(3);

    assert!(!uf.connected(&1, &2));

    uf.union(&1, &2);
    assert!(uf.connected(&1, &2));
    assert!(!uf.connected(&1, &3));
}

#[test]
fn test_path_compression() {
    let mut uf: UnionFind<i32> = UnionFind::new();

    // Create chain: 1 -> 2 -> 3 -> 4
    uf.make_set(1);
    uf.make_set(2);
    uf.make_set(3);
    uf.make_set(4);

    uf.union(&1, &2);
    uf.union(&2, &3);
    uf.union(&3, &4);

    // After find, all should point to same root
    let root = uf.find(&1);
    assert_eq!(uf.find(&2), root);
    assert_eq!(uf.find(&3), root);
    assert_eq!(uf.find(&4), root);
}

#[test]
fn test_find_adds_unknown_elements() {
    let mut uf: UnionFind<usize> = UnionFind::new();
    let root = uf.find(&7);
    assert_eq!(root, 7);
    assert_eq!(uf.len(), 1);
}

#[test]
fn test_groups() {
    let mut uf: UnionFind<String> = UnionFind::new();

    uf.make_set("a".to_string());
    uf.make_set("b".to_string());
    uf.make_set("c".to_string());
    uf.make_set("d".to_string());

    uf.union(&"a".to_string(), &"b".to_string());
    uf.union(&"c".to_string(), &"d".to_string());

    let groups = uf.groups();
    assert_eq!(groups.len(), 2);
}

#[test]
fn test_groups_members_sorted() {
    let mut uf: UnionFind<String> = UnionFind::new();

    // Add in reverse alphabetical order
    uf.make_set("z".to_string());
    uf.make_set("m".to_string());
    uf.make_set("a".to_string());

    uf.union(&"z".to_string(), &"a".to_string());
    uf.union(&"z".to_string(), &"m".to_string());

    let mut groups = uf.groups();
    assert_eq!(groups.len(), 1);

    let members = groups.values_mut().next().unwrap();
    let mut sorted = members.clone();
    sorted.sort();
    assert_eq!(members, &sorted, "members should be sorted");
}

#[test]
fn test_groups_deterministic() {
    // Run multiple times - results should be identical despite
    // HashMap iteration order being random
    let results: Vec<_> = (0..5)
        .map(|_| {
            let mut uf: UnionFind<usize> = UnionFind::new();
            for i in 0..8 {
                uf.make_set(i);
            }
            uf.union(&0, &1);
            uf.union(&1, &2);
            uf.union(&5, &6);
            uf.groups()
        })
        .collect();

    for i in 1..results.len() {
        assert_eq!(results[0].len(), results[i].len());
        for (root, members) in &results[0] {
            assert_eq!(results[i].get(root), Some(members), "run {i} differs");
        }
    }
}
