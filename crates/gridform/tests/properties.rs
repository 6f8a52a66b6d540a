//! Whole-pipeline properties over random list-form configurations.

use gridform::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Entry {
    Field(u8),
    Spacer(u8),
    Break,
}

fn entry(columns: u8) -> impl Strategy<Value = Entry> {
    prop_oneof![
        6 => (1..=columns).prop_map(Entry::Field),
        1 => (1..=columns).prop_map(Entry::Spacer),
        1 => Just(Entry::Break),
    ]
}

fn case() -> impl Strategy<Value = (u8, Vec<Entry>)> {
    (1u8..=24).prop_flat_map(|columns| (Just(columns), prop::collection::vec(entry(columns), 0..24)))
}

fn build(columns: u8, entries: &[Entry]) -> Form {
    let mut schema = ObjectSchema::new();
    let mut configs = Vec::new();
    for (i, e) in entries.iter().enumerate() {
        match e {
            Entry::Field(size) => {
                let name = format!("f{i}");
                schema = schema.field(SchemaField::string(name.as_str()));
                configs.push(FieldConfig::from(FieldSpec::new(name).size(*size)));
            }
            Entry::Spacer(size) => configs.push(FieldConfig::spacer(*size)),
            Entry::Break => configs.push(FieldConfig::row_break()),
        }
    }
    Form::builder()
        .schema(schema)
        .fields(OverrideSpec::list(configs))
        .config(FormConfig::default().with_columns(columns))
        .build()
        .expect("valid sizes always pack")
}

proptest! {
    #[test]
    fn every_row_fills_the_grid((columns, entries) in case()) {
        let form = build(columns, &entries);
        for row in form.rows() {
            prop_assert_eq!(row.width(), u32::from(columns));
        }
    }

    #[test]
    fn fields_keep_their_order((columns, entries) in case()) {
        let form = build(columns, &entries);
        let placed: Vec<String> = form
            .rows()
            .iter()
            .flat_map(|r| r.visible_fields().into_iter().map(|f| f.name.clone()))
            .collect();
        let expected: Vec<String> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, Entry::Field(_)))
            .map(|(i, _)| format!("f{i}"))
            .collect();
        prop_assert_eq!(placed, expected);
    }

    #[test]
    fn rendering_is_idempotent((columns, entries) in case()) {
        let form = build(columns, &entries);
        let first = form.render().expect("render");
        let second = form.render().expect("render");
        prop_assert_eq!(first, second);
        prop_assert_eq!(form.layout_runs(), 1);
    }
}
