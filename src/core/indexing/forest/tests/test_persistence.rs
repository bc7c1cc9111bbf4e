// src/core/indexing/forest/tests/test_persistence.rs

#[cfg(test)]
mod persistence_tests {
    use crate::core::common::WordVecError;
    use crate::core::indexing::forest::tree::{Hyperplane, ProjectionTree, TreeNode};
    use crate::core::indexing::forest::{AnnForest, SearchBudget};
    use crate::core::types::ItemId;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tempfile::tempdir;

    fn built_forest() -> AnnForest {
        let mut rng = StdRng::seed_from_u64(5);
        let mut forest = AnnForest::with_leaf_capacity(6, 3).unwrap();
        for id in 0..250 {
            let v: Vec<f32> = (0..6).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
            forest.add_item(id as ItemId, &v).unwrap();
        }
        forest.build(4, 77).unwrap();
        forest
    }

    #[test]
    fn test_round_trip_preserves_forest_and_answers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("forest.ann");
        let forest = built_forest();
        forest.save(&path).unwrap();

        let loaded = AnnForest::load(&path).unwrap();
        assert!(loaded.is_built());
        assert_eq!(loaded, forest);

        let queries = [[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], [-1.0, 0.0, 1.0, 0.0, -1.0, 0.5]];
        for query in &queries {
            for budget in [SearchBudget::Limited(10), SearchBudget::Limited(60), SearchBudget::Unbounded] {
                assert_eq!(
                    loaded.search_candidates(query, 5, budget).unwrap(),
                    forest.search_candidates(query, 5, budget).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_round_trip_empty_forest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.ann");
        let mut forest = AnnForest::new(4).unwrap();
        forest.build(2, 0).unwrap();
        forest.save(&path).unwrap();
        assert_eq!(AnnForest::load(&path).unwrap(), forest);
    }

    #[test]
    fn test_save_unbuilt_forest_fails() {
        let dir = tempdir().unwrap();
        let forest = AnnForest::new(4).unwrap();
        assert!(matches!(
            forest.save(dir.path().join("f.ann")),
            Err(WordVecError::BuildInvariantViolation(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(AnnForest::load(dir.path().join("absent.ann")), Err(WordVecError::Io(_))));
    }

    #[test]
    fn test_load_rejects_garbage_and_truncation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("forest.ann");
        built_forest().save(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();

        let garbage = dir.path().join("garbage.ann");
        std::fs::write(&garbage, b"definitely not a forest").unwrap();
        assert!(AnnForest::load(&garbage).is_err());

        let truncated = dir.path().join("truncated.ann");
        std::fs::write(&truncated, &bytes[..bytes.len() / 2]).unwrap();
        assert!(AnnForest::load(&truncated).is_err());

        let mut bad_magic = bytes.clone();
        bad_magic[0] ^= 0xff;
        let bad_magic_path = dir.path().join("bad_magic.ann");
        std::fs::write(&bad_magic_path, &bad_magic).unwrap();
        assert!(matches!(AnnForest::load(&bad_magic_path), Err(WordVecError::Serialization(_))));
    }

    // Writes `trees` over two 2-d items through the regular save path, skipping `build`.
    fn save_hand_built(trees: Vec<ProjectionTree>, path: &std::path::Path) {
        let mut forest = AnnForest::with_leaf_capacity(2, 1).unwrap();
        forest.add_item(0, &[1.0, 0.0]).unwrap();
        forest.add_item(1, &[0.0, 1.0]).unwrap();
        forest.trees = trees;
        forest.built = true;
        forest.save(path).unwrap();
    }

    fn split(normal: Vec<f32>, left: u32, right: u32) -> TreeNode {
        TreeNode::Internal { hyperplane: Hyperplane { normal, offset: 0.0 }, left, right }
    }

    #[test]
    fn test_load_accepts_valid_hand_built_tree() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ok.ann");
        let nodes = vec![
            split(vec![1.0, -1.0], 1, 2),
            TreeNode::Leaf { items: vec![1] },
            TreeNode::Leaf { items: vec![0] },
        ];
        save_hand_built(vec![ProjectionTree::from_parts(nodes, 0)], &path);
        assert!(AnnForest::load(&path).is_ok());
    }

    #[test]
    fn test_load_rejects_structural_corruption() {
        let dir = tempdir().unwrap();
        let cases: Vec<(&str, Vec<ProjectionTree>)> = vec![
            ("no trees", vec![]),
            (
                "duplicate item",
                vec![ProjectionTree::from_parts(
                    vec![split(vec![1.0, 0.0], 1, 2), TreeNode::Leaf { items: vec![0] }, TreeNode::Leaf { items: vec![0, 1] }],
                    0,
                )],
            ),
            (
                "missing item",
                vec![ProjectionTree::from_parts(vec![TreeNode::Leaf { items: vec![1] }], 0)],
            ),
            (
                "unknown item",
                vec![ProjectionTree::from_parts(vec![TreeNode::Leaf { items: vec![0, 1, 2] }], 0)],
            ),
            (
                "child out of range",
                vec![ProjectionTree::from_parts(
                    vec![split(vec![1.0, 0.0], 1, 9), TreeNode::Leaf { items: vec![0, 1] }],
                    0,
                )],
            ),
            (
                "root out of range",
                vec![ProjectionTree::from_parts(vec![TreeNode::Leaf { items: vec![0, 1] }], 3)],
            ),
            (
                "shared child",
                vec![ProjectionTree::from_parts(
                    vec![split(vec![1.0, 0.0], 1, 1), TreeNode::Leaf { items: vec![0, 1] }],
                    0,
                )],
            ),
            (
                "wrong normal length",
                vec![ProjectionTree::from_parts(
                    vec![split(vec![1.0, 0.0, 0.0], 1, 2), TreeNode::Leaf { items: vec![0] }, TreeNode::Leaf { items: vec![1] }],
                    0,
                )],
            ),
            (
                "detached cycle",
                vec![ProjectionTree::from_parts(
                    vec![
                        TreeNode::Leaf { items: vec![0] },
                        split(vec![1.0, 0.0], 2, 3),
                        split(vec![0.0, 1.0], 1, 4),
                        TreeNode::Leaf { items: vec![1] },
                        TreeNode::Leaf { items: vec![] },
                    ],
                    0,
                )],
            ),
        ];

        for (name, trees) in cases {
            let path = dir.path().join(format!("{}.ann", name.replace(' ', "_")));
            save_hand_built(trees, &path);
            assert!(
                matches!(AnnForest::load(&path), Err(WordVecError::Serialization(_))),
                "case '{name}' was accepted"
            );
        }
    }
}
