//! Property tests for sanitizing and mapping rows.

use memeraki_model::{IssueKind, PipelineKind, RawRow};
use memeraki_transform::{DocumentMapper, IdStrategy, Sanitizer};
use proptest::prelude::*;

fn non_blank() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 _-]{0,30}".prop_filter("not the null literal", |s| {
        !s.trim().eq_ignore_ascii_case("null")
    })
}

fn pipeline() -> impl Strategy<Value = PipelineKind> {
    prop_oneof![Just(PipelineKind::Artists), Just(PipelineKind::Artforms)]
}

fn id_strategy() -> impl Strategy<Value = IdStrategy> {
    prop_oneof![
        Just(IdStrategy::Verbatim),
        Just(IdStrategy::Slug),
        Just(IdStrategy::Hash)
    ]
}

proptest! {
    #[test]
    fn valid_rows_have_no_empty_required_fields(
        pipeline in pipeline(),
        name in non_blank(),
        slug in non_blank(),
        padding in " {0,3}",
    ) {
        let row = RawRow::new(2)
            .with_value("name", format!("{padding}{name}{padding}"))
            .with_value("slug", slug);
        let sanitizer = Sanitizer::for_pipeline(pipeline);
        let record = sanitizer.sanitize(&row).unwrap();
        for spec in sanitizer.schema().required_fields() {
            let value = record.get(spec.name).expect("required field present");
            prop_assert!(!value.to_string().trim().is_empty());
        }
        prop_assert_eq!(record.text("name"), Some(name.trim()));
    }

    #[test]
    fn blank_name_is_rejected_naming_the_field(
        pipeline in pipeline(),
        blank in "[ \t]{0,4}",
        slug in non_blank(),
        line in 2u64..10_000,
    ) {
        let row = RawRow::new(line).with_value("name", blank).with_value("slug", slug);
        let err = Sanitizer::for_pipeline(pipeline).sanitize(&row).unwrap_err();
        prop_assert_eq!(err.line, line);
        prop_assert_eq!(err.fields(), vec!["name"]);
        prop_assert_eq!(&err.issues[0].kind, &IssueKind::Missing);
    }

    #[test]
    fn mapping_is_idempotent(
        pipeline in pipeline(),
        name in non_blank(),
        slug in "[0-9][a-z0-9]{0,7}( [a-z0-9]{1,8}){0,3}",
        strategy in id_strategy(),
    ) {
        let sanitizer = Sanitizer::for_pipeline(pipeline);
        let mapper = DocumentMapper::for_pipeline(pipeline).with_strategy(strategy);
        let row = RawRow::new(2).with_value("name", name).with_value("slug", slug);

        let first = mapper.map(sanitizer.sanitize(&row).unwrap()).unwrap();
        let second = mapper.map(sanitizer.sanitize(&row.clone()).unwrap()).unwrap();
        prop_assert_eq!(&first.id, &second.id);
        prop_assert_eq!(first, second);
    }
}
