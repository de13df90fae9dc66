// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only tree adapter over a survey.
//!
//! Presentation layers browse the containment tree as generic nodes
//! (Survey → Series → {inner Series, Legs}) without the model carrying any
//! UI event plumbing. The adapter holds only shared references; it cannot
//! mutate the survey.

use crate::leg::Leg;
use crate::series::Series;
use crate::survey::Survey;

/// A node in the browsable survey tree.
#[derive(Debug, Clone, Copy)]
pub enum TreeNode<'a> {
    Survey(&'a Survey),
    Series(&'a Series),
    /// A leg, addressed as (owning series, leg index).
    Leg(&'a Series, usize),
}

/// Read-only tree view of a survey.
#[derive(Debug, Clone, Copy)]
pub struct SurveyTree<'a> {
    root: &'a Survey,
}

impl Survey {
    /// A read-only tree view for presentation layers.
    pub fn tree(&self) -> SurveyTree<'_> {
        SurveyTree { root: self }
    }
}

impl<'a> SurveyTree<'a> {
    pub fn root(&self) -> TreeNode<'a> {
        TreeNode::Survey(self.root)
    }

    /// Number of children under a node. Series children are the inner
    /// series followed by the direct legs.
    pub fn child_count(&self, node: TreeNode<'a>) -> usize {
        match node {
            TreeNode::Survey(survey) => survey.series_count(),
            TreeNode::Series(series) => series.inner_series_count() + series.leg_count(),
            TreeNode::Leg(..) => 0,
        }
    }

    pub fn child(&self, node: TreeNode<'a>, index: usize) -> Option<TreeNode<'a>> {
        match node {
            TreeNode::Survey(survey) => survey.series_at(index).map(TreeNode::Series),
            TreeNode::Series(series) => {
                let inner = series.inner_series_count();
                if index < inner {
                    series.inner_series_at(index).map(TreeNode::Series)
                } else if index - inner < series.leg_count() {
                    Some(TreeNode::Leg(series, index - inner))
                } else {
                    None
                }
            }
            TreeNode::Leg(..) => None,
        }
    }

    /// Resolves a child's position under its parent, the inverse of
    /// [`SurveyTree::child`]. Series identity is by reference.
    pub fn index_of_child(&self, parent: TreeNode<'a>, child: TreeNode<'a>) -> Option<usize> {
        match (parent, child) {
            (TreeNode::Survey(survey), TreeNode::Series(series)) => survey
                .series()
                .iter()
                .position(|s| std::ptr::eq(s, series)),
            (TreeNode::Series(series), TreeNode::Series(inner)) => series
                .inner_series()
                .iter()
                .position(|s| std::ptr::eq(s, inner)),
            (TreeNode::Series(series), TreeNode::Leg(owner, index)) => {
                if std::ptr::eq(series, owner) {
                    Some(series.inner_series_count() + index)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Display label for a node, for tree-view rendering.
    pub fn label(&self, node: TreeNode<'a>) -> String {
        match node {
            TreeNode::Survey(survey) => format!("Survey ({} series)", survey.series_count()),
            TreeNode::Series(series) => series.name().to_string(),
            TreeNode::Leg(series, index) => match series.leg(index) {
                Some(leg) => format!("{} -> {}", leg.from().name(), leg.to().name()),
                None => String::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::Station;

    fn sample() -> Survey {
        let mut survey = Survey::new();
        let mut cave = Series::new("cave");
        cave.add_leg(Leg::new(
            Station::new("1").unwrap(),
            Station::new("2").unwrap(),
            5.0,
            100.0,
            -2.0,
        ));
        cave.add_inner_series(Series::new("loop"));
        survey.add_series(cave);
        survey
    }

    #[test]
    fn navigation() {
        let survey = sample();
        let tree = survey.tree();
        let root = tree.root();
        assert_eq!(tree.child_count(root), 1);

        let cave = tree.child(root, 0).unwrap();
        // inner series first, then legs
        assert_eq!(tree.child_count(cave), 2);
        assert!(matches!(tree.child(cave, 0), Some(TreeNode::Series(_))));
        assert!(matches!(tree.child(cave, 1), Some(TreeNode::Leg(_, 0))));
        assert!(tree.child(cave, 2).is_none());
    }

    #[test]
    fn child_index_round_trip() {
        let survey = sample();
        let tree = survey.tree();
        let root = tree.root();
        let cave = tree.child(root, 0).unwrap();
        for i in 0..tree.child_count(cave) {
            let child = tree.child(cave, i).unwrap();
            assert_eq!(tree.index_of_child(cave, child), Some(i));
        }
        assert_eq!(tree.index_of_child(root, cave), Some(0));
    }

    #[test]
    fn labels() {
        let survey = sample();
        let tree = survey.tree();
        let cave = tree.child(tree.root(), 0).unwrap();
        assert_eq!(tree.label(cave), "cave");
        let leg = tree.child(cave, 1).unwrap();
        assert_eq!(tree.label(leg), "1 -> 2");
    }
}
