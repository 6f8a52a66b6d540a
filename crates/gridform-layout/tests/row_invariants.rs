//! Property tests for grid packing.
//!
//! Random field streams (sized, unsized, row breaks, sized spacers) against
//! the public packer, asserting the row-sum invariant, order preservation,
//! and that packing is a pure function of its input.

use gridform_core::{FieldRole, InternalField};
use gridform_layout::{GridConfig, GridPacker, GridRow, LayoutError};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Entry {
    Field(Option<u8>),
    RowBreak,
    Spacer(u8),
}

fn entry(columns: u8) -> impl Strategy<Value = Entry> {
    prop_oneof![
        6 => proptest::option::of(1..=columns).prop_map(Entry::Field),
        1 => Just(Entry::RowBreak),
        1 => (1..=columns).prop_map(Entry::Spacer),
    ]
}

fn build(entries: &[Entry]) -> Vec<InternalField> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| match e {
            Entry::Field(size) => {
                let mut f = InternalField::detached(format!("f{i}"));
                f.size = *size;
                f
            }
            Entry::RowBreak => InternalField::spacer(None),
            Entry::Spacer(size) => InternalField::spacer(Some(*size)),
        })
        .collect()
}

fn field_names(rows: &[GridRow]) -> Vec<String> {
    rows.iter()
        .flat_map(|r| r.cells().iter())
        .filter(|c| c.field.role == FieldRole::Field)
        .map(|c| c.field.name.clone())
        .collect()
}

fn columns_and_entries() -> impl Strategy<Value = (u8, Vec<Entry>)> {
    (1u8..=24).prop_flat_map(|columns| {
        (
            Just(columns),
            prop::collection::vec(entry(columns), 0..40),
        )
    })
}

proptest! {
    #[test]
    fn every_row_sums_to_grid_width((columns, entries) in columns_and_entries()) {
        let fields = build(&entries);
        let rows = GridPacker::new(GridConfig::with_columns(columns))
            .pack(&fields)
            .expect("valid sizes always pack");
        for row in &rows {
            prop_assert_eq!(row.width(), u32::from(columns));
            prop_assert!(!row.cells().is_empty());
        }
    }

    #[test]
    fn field_order_is_preserved((columns, entries) in columns_and_entries()) {
        let fields = build(&entries);
        let rows = GridPacker::new(GridConfig::with_columns(columns))
            .pack(&fields)
            .expect("valid sizes always pack");
        let expected: Vec<String> = fields
            .iter()
            .filter(|f| f.role == FieldRole::Field)
            .map(|f| f.name.clone())
            .collect();
        prop_assert_eq!(field_names(&rows), expected);
    }

    #[test]
    fn packing_is_deterministic((columns, entries) in columns_and_entries()) {
        let fields = build(&entries);
        let packer = GridPacker::new(GridConfig::with_columns(columns));
        let a = packer.pack(&fields).expect("pack");
        let b = packer.pack(&fields).expect("pack");
        let spans = |rows: &[GridRow]| -> Vec<Vec<u8>> {
            rows.iter().map(|r| r.cells().iter().map(|c| c.span).collect()).collect()
        };
        prop_assert_eq!(spans(&a), spans(&b));
        prop_assert_eq!(field_names(&a), field_names(&b));
    }

    #[test]
    fn oversized_spans_always_fail(size in 13u8..=u8::MAX) {
        let mut f = InternalField::detached("big");
        f.size = Some(size);
        let err = gridform_layout::pack(&[f]).expect_err("span exceeds grid");
        let is_invalid_size = matches!(err, LayoutError::InvalidSize { .. });
        prop_assert!(is_invalid_size);
    }
}
