//! Exclusion by category or type.

use incident_map_filter_models::{CategoryState, Verdict};
use incident_map_incident_models::{Incident, TypeIds};

use super::EvalContext;

fn is_hidden(list: &[String], id: &str) -> bool {
    list.iter().any(|hidden| hidden == id)
}

/// A single-type incident passes unless its type or that type's category is
/// hidden.
///
/// A multi-type incident passes when at least one of its types is visible
/// and at least one of their categories is visible; the two need not come
/// from the same type. Types missing from the lookup contribute no category.
#[must_use]
pub fn evaluate(
    incident: &Incident,
    state: Option<&CategoryState>,
    ctx: &EvalContext<'_>,
) -> Verdict {
    let Some(state) = state else {
        return Verdict::Indeterminate;
    };

    let pass = match &incident.type_id {
        TypeIds::One(type_id) => {
            !is_hidden(&state.hidden_types, type_id)
                && ctx
                    .category_of(type_id)
                    .is_none_or(|category| !is_hidden(&state.hidden_categories, category))
        }
        TypeIds::Many(type_ids) => {
            type_ids
                .iter()
                .any(|type_id| !is_hidden(&state.hidden_types, type_id))
                && type_ids
                    .iter()
                    .filter_map(|type_id| {
                        let category = ctx.category_of(type_id);
                        if category.is_none() {
                            log::debug!(
                                "Incident type '{type_id}' has no known category; skipping it"
                            );
                        }
                        category
                    })
                    .any(|category| !is_hidden(&state.hidden_categories, category))
        }
    };

    Verdict::from(pass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn hiding(categories: &[&str], types: &[&str]) -> CategoryState {
        CategoryState {
            hidden_categories: categories.iter().map(ToString::to_string).collect(),
            hidden_types: types.iter().map(ToString::to_string).collect(),
        }
    }

    fn with_types(ids: &[&str]) -> Incident {
        let mut incident = fixtures::incident("2020-01-01", "X");
        incident.type_id = TypeIds::Many(ids.iter().map(ToString::to_string).collect());
        incident
    }

    #[test]
    fn unconfigured_is_indeterminate() {
        let db = fixtures::db();
        let ctx = EvalContext::new(&db);
        assert_eq!(
            evaluate(&db.incidents["A"], None, &ctx),
            Verdict::Indeterminate
        );
    }

    #[test]
    fn single_type_fails_on_hidden_type_or_category() {
        let db = fixtures::db();
        let ctx = EvalContext::new(&db);
        let a = &db.incidents["A"];

        assert_eq!(evaluate(a, Some(&hiding(&[], &[])), &ctx), Verdict::Pass);
        assert_eq!(evaluate(a, Some(&hiding(&["c1"], &[])), &ctx), Verdict::Fail);
        assert_eq!(evaluate(a, Some(&hiding(&[], &["t1"])), &ctx), Verdict::Fail);
        assert_eq!(evaluate(a, Some(&hiding(&["c2"], &["t2"])), &ctx), Verdict::Pass);
    }

    #[test]
    fn multi_type_needs_one_surviving_type_and_category() {
        let db = fixtures::db();
        let ctx = EvalContext::new(&db);
        let both = with_types(&["t1", "t2"]);

        assert_eq!(evaluate(&both, Some(&hiding(&["c1"], &[])), &ctx), Verdict::Pass);
        assert_eq!(
            evaluate(&both, Some(&hiding(&["c1", "c2"], &[])), &ctx),
            Verdict::Fail
        );
        assert_eq!(
            evaluate(&both, Some(&hiding(&[], &["t1", "t2"])), &ctx),
            Verdict::Fail
        );
        // t1 visible and c1 hidden, t2 hidden and c2 visible: still one of each.
        assert_eq!(
            evaluate(&both, Some(&hiding(&["c1"], &["t2"])), &ctx),
            Verdict::Pass
        );
    }

    #[test]
    fn unknown_types() {
        let db = fixtures::db();
        let ctx = EvalContext::new(&db);

        let mut single = fixtures::incident("2020-01-01", "X");
        single.type_id = TypeIds::One("ghost".to_string());
        assert_eq!(evaluate(&single, Some(&hiding(&["c1"], &[])), &ctx), Verdict::Pass);

        let many = with_types(&["ghost"]);
        assert_eq!(evaluate(&many, Some(&hiding(&[], &[])), &ctx), Verdict::Fail);
    }
}
