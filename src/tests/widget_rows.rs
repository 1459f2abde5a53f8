use super::*;

fn birds() -> Vec<MemoryRow> {
    vec![
        MemoryRow::new("Robin"),
        MemoryRow::new("Blue Jay"),
        MemoryRow::new("Sparrow"),
    ]
}

fn visibility(rows: &[MemoryRow]) -> Vec<bool> {
    rows.iter().map(|row| row.visible).collect()
}

#[test]
fn filter_keeps_only_rows_containing_the_term() {
    let mut rows = birds();
    let report = apply_filter("jay", &mut rows);

    assert_eq!(visibility(&rows), vec![false, true, false]);
    assert_eq!(report, FilterReport { total: 3, shown: 1 });
    assert_eq!(report.hidden(), 2);
}

#[test]
fn filter_ignores_case_on_both_sides() {
    let mut rows = birds();
    apply_filter("bLuE", &mut rows);
    assert_eq!(visibility(&rows), vec![false, true, false]);

    apply_filter("R", &mut rows);
    assert_eq!(visibility(&rows), vec![true, false, true]);
}

#[test]
fn empty_term_shows_every_row() {
    let mut rows = birds();
    apply_filter("zzz", &mut rows);
    assert_eq!(visibility(&rows), vec![false, false, false]);

    let report = apply_filter("", &mut rows);
    assert_eq!(visibility(&rows), vec![true, true, true]);
    assert_eq!(report.shown, 3);
}

#[test]
fn whitespace_in_the_term_is_matched_literally() {
    let mut rows = birds();
    apply_filter("e j", &mut rows);
    assert_eq!(visibility(&rows), vec![false, true, false]);

    apply_filter(" ", &mut rows);
    assert_eq!(visibility(&rows), vec![false, true, false]);
}

#[test]
fn filter_over_an_empty_list_is_a_no_op() {
    let mut rows: Vec<MemoryRow> = Vec::new();
    assert_eq!(apply_filter("owl", &mut rows), FilterReport::default());
    assert_eq!(set_all_toggles(&mut rows, true), ToggleReport::default());
}

#[test]
fn filter_does_not_touch_toggles() {
    let mut rows = vec![
        MemoryRow::new("Robin").with_checked(true),
        MemoryRow::new("Owl"),
    ];
    apply_filter("owl", &mut rows);

    assert_eq!(rows[0].toggle, Some(true));
    assert_eq!(rows[1].toggle, Some(false));
}

#[test]
fn set_all_toggles_overrides_prior_state() {
    let mut rows = vec![
        MemoryRow::new("Robin"),
        MemoryRow::new("Owl").with_checked(true),
    ];

    let report = set_all_toggles(&mut rows, true);
    assert_eq!(
        rows.iter().map(Row::checked).collect::<Vec<_>>(),
        vec![Some(true), Some(true)]
    );
    assert_eq!(report.updated, 2);
    assert!(report.is_complete());

    set_all_toggles(&mut rows, false);
    assert_eq!(
        rows.iter().map(Row::checked).collect::<Vec<_>>(),
        vec![Some(false), Some(false)]
    );
}

#[test]
fn set_all_toggles_reaches_hidden_rows() {
    let mut rows = birds();
    apply_filter("robin", &mut rows);
    set_all_toggles(&mut rows, true);

    assert_eq!(visibility(&rows), vec![true, false, false]);
    assert!(rows.iter().all(|row| row.toggle == Some(true)));
}

#[test]
fn rows_without_a_toggle_are_skipped_and_reported() {
    let mut rows = vec![
        MemoryRow::new("Robin"),
        MemoryRow::new("Heading").without_toggle(),
        MemoryRow::new("Owl"),
    ];

    let report = set_all_toggles(&mut rows, true);

    assert_eq!(rows[0].toggle, Some(true));
    assert_eq!(rows[1].toggle, None);
    assert_eq!(rows[2].toggle, Some(true));
    assert_eq!(report.updated, 2);
    assert!(!report.is_complete());
    assert_eq!(
        report.skipped,
        vec![SkippedRow {
            index: 1,
            reason: Error::MissingToggleControl {
                row: "Heading".into()
            },
        }]
    );
}

#[test]
fn case_fold_handles_non_ascii_letters() {
    assert!(matches_term("Grünfink", "GRÜN"));
    assert!(matches_term("Straße Taube", "STRASSE"));
    assert!(matches_term("anything", ""));
    assert!(!matches_term("Robin", "robins"));
    assert_eq!(case_fold("ß"), "SS");
}

#[test]
fn operations_accept_slices() {
    let mut rows = birds();
    let slice: &mut [MemoryRow] = &mut rows[1..];

    let report = apply_filter("sparrow", slice);
    assert_eq!(report.total, 2);
    assert_eq!(slice.row_count(), 2);
    assert_eq!(visibility(&rows), vec![true, false, true]);
}

fn dom_list() -> Result<(Dom, NodeId)> {
    let dom = Dom::parse(
        r#"
        <ul id='birdList'>
          <li class='list-group-item'><input type='checkbox'> Robin</li>
          <li class='list-group-item'>Section: <em>Owls</em></li>
          <li class='list-group-item'><label><input type='checkbox' checked> Barn Owl</label></li>
        </ul>
        "#,
    )?;
    let list = dom.by_id("birdList").expect("list exists");
    Ok((dom, list))
}

#[test]
fn dom_rows_filter_by_text_content_through_inline_style() -> Result<()> {
    let (mut dom, list) = dom_list()?;
    let mut rows = DomRows::from_list(&mut dom, list, "list-group-item", "input");
    assert_eq!(rows.row_count(), 3);
    let nodes = rows.nodes().to_vec();

    let report = apply_filter("OWL", &mut rows);
    assert_eq!(report, FilterReport { total: 3, shown: 2 });
    assert!(dom.is_display_none(nodes[0]));
    assert!(!dom.is_display_none(nodes[1]));
    assert!(!dom.is_display_none(nodes[2]));

    let mut rows = DomRows::from_list(&mut dom, list, "list-group-item", "input");
    apply_filter("", &mut rows);
    assert!(nodes.iter().all(|node| !dom.is_display_none(*node)));
    Ok(())
}

#[test]
fn dom_rows_toggle_nested_checkboxes_and_skip_rows_without_one() -> Result<()> {
    let (mut dom, list) = dom_list()?;
    let mut rows = DomRows::from_list(&mut dom, list, "list-group-item", "input");

    let report = set_all_toggles(&mut rows, false);
    assert_eq!(report.updated, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 1);
    assert_eq!(
        report.skipped[0].reason,
        Error::MissingToggleControl {
            row: "Section: Owls".into()
        }
    );

    let boxes = dom.query_selector_all("#birdList input")?;
    assert!(boxes.iter().all(|node| dom.checked(*node) == Some(false)));
    Ok(())
}

#[test]
fn dom_row_reports_visibility_and_toggle_state() -> Result<()> {
    let (mut dom, list) = dom_list()?;
    let mut rows = DomRows::from_list(&mut dom, list, "list-group-item", "input");

    let mut seen = Vec::new();
    rows.for_each_row(&mut |index, row| {
        if index == 0 {
            row.set_visible(false);
        }
        seen.push((row.is_visible(), row.checked()));
    });

    assert_eq!(
        seen,
        vec![(false, Some(false)), (true, None), (true, Some(true))]
    );
    Ok(())
}

#[test]
fn bind_resolves_every_control() -> Result<()> {
    let dom = Dom::parse(BIRD_PAGE)?;
    let widget = ListFilterWidget::default().bind(&dom)?;

    assert_eq!(dom.by_id("searchInput"), Some(widget.input()));
    assert_eq!(dom.by_id("birdList"), Some(widget.list()));
    assert_eq!(dom.by_id("selectAllBirds"), Some(widget.select_all_control()));
    assert_eq!(
        dom.by_id("deselectAllBirds"),
        Some(widget.deselect_all_control())
    );
    assert_eq!(widget.row_class(), "list-group-item");
    assert_eq!(widget.toggle_selector(), "input");
    Ok(())
}

#[test]
fn bind_fails_fast_on_a_missing_list() -> Result<()> {
    let dom = Dom::parse(BIRD_PAGE)?;
    let config = WidgetConfig {
        list_id: "speciesList".into(),
        ..WidgetConfig::default()
    };

    let err = ListFilterWidget::new(config)
        .bind(&dom)
        .expect_err("list is absent");
    assert_eq!(
        err,
        Error::MissingTargetElement {
            role: "list container".into(),
            id: "speciesList".into(),
        }
    );
    assert_eq!(err.to_string(), "missing list container element: #speciesList");
    Ok(())
}

#[test]
fn bound_widget_filters_by_the_input_value() -> Result<()> {
    let mut dom = Dom::parse(BIRD_PAGE)?;
    let widget = ListFilterWidget::default().bind(&dom)?;

    dom.set_value(widget.input(), "SPAR")?;
    let report = widget.filter(&mut dom);
    assert_eq!(report, FilterReport { total: 3, shown: 1 });

    let toggled = widget.select_all(&mut dom);
    assert_eq!(toggled.updated, 3);
    let toggled = widget.deselect_all(&mut dom);
    assert!(toggled.is_complete());
    assert_eq!(dom.query_selector_all("input:checked")?, Vec::new());
    Ok(())
}
