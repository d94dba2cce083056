//! Property-based tests for one-hot encoding.
//!
//! Generates arbitrary complete selections and arbitrary trained column
//! orders, and checks both encoders against the one-hot contract.

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;
use proptest::sample::Index;

use sporecast::encoding::parse_column;
use sporecast::testing::mushroom_columns;
use sporecast::{encode, AttributeSchema, ColumnIndex, Selections};

// =============================================================================
// Strategies
// =============================================================================

/// A complete selection set with one valid code per attribute.
fn arb_selections() -> impl Strategy<Value = Selections> {
    let schema = AttributeSchema::mushroom();
    prop_vec(any::<Index>(), schema.len()).prop_map(move |picks| {
        schema
            .attributes()
            .iter()
            .zip(picks)
            .map(|(attribute, pick)| {
                let category = &attribute.categories[pick.index(attribute.categories.len())];
                (attribute.name, category.code)
            })
            .collect()
    })
}

/// The full column list in a random order.
fn arb_columns() -> impl Strategy<Value = Vec<String>> {
    Just(mushroom_columns()).prop_shuffle()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn one_hot_per_attribute(selections in arb_selections(), columns in arb_columns()) {
        let row = encode(&selections, &columns).unwrap();
        prop_assert_eq!(row.len(), columns.len());
        prop_assert_eq!(row.sum(), AttributeSchema::mushroom().len() as f64);
    }

    #[test]
    fn hot_iff_selected(selections in arb_selections(), columns in arb_columns()) {
        let row = encode(&selections, &columns).unwrap();
        for (value, column) in row.iter().zip(&columns) {
            let (attribute, code) = parse_column(column).unwrap();
            let selected = selections.get(attribute) == Some(code);
            prop_assert_eq!(*value == 1.0, selected, "column {}", column);
            prop_assert!(*value == 0.0 || *value == 1.0);
        }
    }

    #[test]
    fn index_agrees_with_direct_encode(
        selections in arb_selections(),
        columns in arb_columns(),
    ) {
        let index = ColumnIndex::build(AttributeSchema::mushroom(), &columns).unwrap();
        prop_assert!(index.validate(&selections).is_ok());
        prop_assert_eq!(
            index.encode(&selections).unwrap(),
            encode(&selections, &columns).unwrap()
        );
    }
}
