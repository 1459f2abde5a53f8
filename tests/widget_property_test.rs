use bird_list_filter::{
    MemoryRow, Page, Species, WidgetConfig, apply_filter, render_bird_list, set_all_toggles,
};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

const WIDGET_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/widget_property_test.txt";
const DEFAULT_WIDGET_PROPTEST_CASES: u32 = 128;

const SPECIES: &[(i64, &str, &str)] = &[
    (1, "American Robin", "AMRO"),
    (2, "Blue Jay", "BLJA"),
    (3, "House Sparrow", "HOSP"),
    (4, "Barn Owl", "BANO"),
    (5, "Northern Cardinal", "NOCA"),
    (6, "Song Sparrow", "SOSP"),
];

#[derive(Clone, Debug)]
enum PageAction {
    TypeText(String),
    SelectAll,
    DeselectAll,
    ClickRow(usize),
}

fn widget_proptest_cases() -> u32 {
    std::env::var("BIRD_LIST_FILTER_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_WIDGET_PROPTEST_CASES)
}

fn text_strategy(max_len: usize) -> BoxedStrategy<String> {
    vec(
        prop_oneof![
            Just('a'),
            Just('B'),
            Just('o'),
            Just('R'),
            Just('w'),
            Just('N'),
            Just('r'),
            Just('O'),
            Just(' '),
        ],
        0..=max_len,
    )
    .prop_map(|chars| chars.into_iter().collect())
    .boxed()
}

fn row_strategy() -> BoxedStrategy<MemoryRow> {
    (text_strategy(12), any::<bool>(), prop::option::of(any::<bool>()))
        .prop_map(|(label, visible, toggle)| MemoryRow {
            label,
            visible,
            toggle,
        })
        .boxed()
}

fn rows_strategy() -> BoxedStrategy<Vec<MemoryRow>> {
    vec(row_strategy(), 0..=16).boxed()
}

fn page_action_strategy() -> BoxedStrategy<PageAction> {
    prop_oneof![
        5 => text_strategy(4).prop_map(PageAction::TypeText),
        2 => Just(PageAction::SelectAll),
        2 => Just(PageAction::DeselectAll),
        2 => (0..SPECIES.len()).prop_map(PageAction::ClickRow),
    ]
    .boxed()
}

fn ascii_contains(label: &str, term: &str) -> bool {
    label
        .to_ascii_lowercase()
        .contains(&term.to_ascii_lowercase())
}

fn labels(rows: &[MemoryRow]) -> Vec<&str> {
    rows.iter().map(|row| row.label.as_str()).collect()
}

fn fail(err: bird_list_filter::Error) -> TestCaseError {
    TestCaseError::fail(format!("{err:?}"))
}

fn assert_filter_properties(mut rows: Vec<MemoryRow>, term: &str) -> TestCaseResult {
    let before = rows.clone();
    let report = apply_filter(term, &mut rows);

    prop_assert_eq!(labels(&rows), labels(&before));
    prop_assert_eq!(report.total, rows.len());
    for (row, original) in rows.iter().zip(&before) {
        prop_assert_eq!(row.visible, ascii_contains(&row.label, term));
        prop_assert_eq!(row.toggle, original.toggle);
    }
    prop_assert_eq!(report.shown, rows.iter().filter(|row| row.visible).count());

    let once = rows.clone();
    apply_filter(term, &mut rows);
    prop_assert_eq!(&rows, &once);

    apply_filter("", &mut rows);
    prop_assert!(rows.iter().all(|row| row.visible));
    Ok(())
}

fn assert_toggle_properties(mut rows: Vec<MemoryRow>, checked: bool) -> TestCaseResult {
    let before = rows.clone();
    let report = set_all_toggles(&mut rows, checked);

    let mut skipped = Vec::new();
    for (index, (row, original)) in rows.iter().zip(&before).enumerate() {
        prop_assert_eq!(&row.label, &original.label);
        prop_assert_eq!(row.visible, original.visible);
        match original.toggle {
            Some(_) => {
                prop_assert_eq!(row.toggle, Some(checked));
            }
            None => {
                prop_assert_eq!(row.toggle, None);
                skipped.push(index);
            }
        }
    }
    prop_assert_eq!(
        report.skipped.iter().map(|row| row.index).collect::<Vec<_>>(),
        skipped
    );
    prop_assert_eq!(report.updated + report.skipped.len(), rows.len());
    Ok(())
}

fn assert_page_sequence_is_consistent(actions: &[PageAction]) -> TestCaseResult {
    let species = SPECIES
        .iter()
        .map(|(id, name, code)| Species::new(*id, *name, *code))
        .collect::<Vec<_>>();
    let config = WidgetConfig::default();
    let mut page = Page::from_html(&render_bird_list(&species, &config)).map_err(fail)?;
    page.mount(config).map_err(fail)?;

    let order = page.row_labels().map_err(fail)?;
    let raw_labels = page
        .dom()
        .query_selector_all("#birdList .list-group-item")
        .map_err(fail)?
        .into_iter()
        .map(|row| page.dom().text_content(row))
        .collect::<Vec<_>>();
    let mut term = String::new();
    let mut expected_checks = vec![Some(false); order.len()];

    for (step, action) in actions.iter().enumerate() {
        match action {
            PageAction::TypeText(text) => {
                page.type_text("#searchInput", text).map_err(fail)?;
                term = text.clone();
            }
            PageAction::SelectAll => {
                page.click("#selectAllBirds").map_err(fail)?;
                expected_checks.fill(Some(true));
            }
            PageAction::DeselectAll => {
                page.click("#deselectAllBirds").map_err(fail)?;
                expected_checks.fill(Some(false));
            }
            PageAction::ClickRow(index) => {
                let id = SPECIES[*index].0;
                page.click(&format!("#bird-{id}")).map_err(fail)?;
                let position = order
                    .iter()
                    .position(|label| label == SPECIES[*index].1)
                    .ok_or_else(|| TestCaseError::fail("rendered row missing"))?;
                expected_checks[position] = expected_checks[position].map(|state| !state);
            }
        }

        let expected_visible = order
            .iter()
            .zip(&raw_labels)
            .filter(|(_, raw)| ascii_contains(raw, &term))
            .map(|(label, _)| label.clone())
            .collect::<Vec<_>>();
        prop_assert_eq!(
            page.visible_labels().map_err(fail)?,
            expected_visible,
            "visible rows after step {}: {:?}",
            step,
            action
        );
        prop_assert_eq!(
            page.checked_states().map_err(fail)?,
            expected_checks.clone(),
            "toggles after step {}: {:?}",
            step,
            action
        );
        prop_assert_eq!(page.row_labels().map_err(fail)?, order.clone());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: widget_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(WIDGET_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn filter_shows_exactly_the_rows_containing_the_term(
        rows in rows_strategy(),
        term in text_strategy(3),
    ) {
        assert_filter_properties(rows, &term)?;
    }

    #[test]
    fn bulk_toggle_sets_every_row_that_has_a_toggle(
        rows in rows_strategy(),
        checked in any::<bool>(),
    ) {
        assert_toggle_properties(rows, checked)?;
    }

    #[test]
    fn page_actions_keep_visibility_and_toggles_consistent(
        actions in vec(page_action_strategy(), 1..=24),
    ) {
        assert_page_sequence_is_consistent(&actions)?;
    }
}
