use super::*;

#[test]
fn default_config_names_the_bird_page_controls() {
    let config = WidgetConfig::default();
    assert_eq!(config.input_id, "searchInput");
    assert_eq!(config.list_id, "birdList");
    assert_eq!(config.row_class, "list-group-item");
    assert_eq!(config.toggle_selector, "input");
    assert_eq!(config.select_all_id, "selectAllBirds");
    assert_eq!(config.deselect_all_id, "deselectAllBirds");
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn partial_toml_falls_back_to_defaults() -> Result<()> {
    let config = WidgetConfig::from_toml_str(
        r#"
        list_id = "speciesList"
        toggle_selector = "input[type=checkbox]"
        "#,
    )?;

    assert_eq!(config.list_id, "speciesList");
    assert_eq!(config.toggle_selector, "input[type=checkbox]");
    assert_eq!(config.input_id, "searchInput");
    Ok(())
}

#[test]
fn config_survives_toml_serialization() -> Result<()> {
    let config = WidgetConfig {
        row_class: "species-row".into(),
        ..WidgetConfig::default()
    };
    let text = config.to_toml_string()?;
    assert!(text.contains("row_class = \"species-row\""));
    assert_eq!(WidgetConfig::from_toml_str(&text)?, config);
    Ok(())
}

#[test]
fn invalid_config_is_rejected() {
    let cases = [
        "input_id = \"\"",
        "list_id = \"bird list\"",
        "row_class = \"  \"",
        "toggle_selector = \"input[\"",
        "list_id = 7",
    ];
    for src in cases {
        assert!(
            matches!(WidgetConfig::from_toml_str(src), Err(Error::Config { .. })),
            "{src:?} should be rejected"
        );
    }
}

#[test]
fn bind_rejects_an_invalid_config_before_touching_the_page() -> Result<()> {
    let dom = Dom::parse(BIRD_PAGE)?;
    let config = WidgetConfig {
        toggle_selector: "input >".into(),
        ..WidgetConfig::default()
    };
    assert!(matches!(
        ListFilterWidget::new(config).bind(&dom),
        Err(Error::Config { .. })
    ));
    Ok(())
}

#[test]
fn load_reports_unreadable_files_as_config_errors() {
    let err = WidgetConfig::load("/nonexistent/bird-list-filter.toml")
        .expect_err("file does not exist");
    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().contains("bird-list-filter.toml"));
}

#[test]
fn species_deserialize_from_the_map_api_shape() -> Result<()> {
    let species: Species = toml::from_str(
        r#"
        speciesID = 12
        species = "Northern Cardinal"
        birdcode = "NOCA"
        "#,
    )
    .map_err(|err| Error::Config {
        reason: err.to_string(),
    })?;
    assert_eq!(species, Species::new(12, "Northern Cardinal", "NOCA"));
    Ok(())
}

#[test]
fn rows_render_sorted_by_species_name() {
    let species = vec![
        Species::new(3, "Sparrow", "HOSP"),
        Species::new(1, "American Robin", "AMRO"),
        Species::new(2, "Blue Jay", "BLJA"),
    ];
    let html = render_bird_rows(&species, &WidgetConfig::default());
    let lines = html.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        r#"<li class="list-group-item"><input type="checkbox" name="bird" id="bird-1" value="AMRO"> <label for="bird-1">American Robin</label></li>"#
    );
    assert!(lines[1].contains("Blue Jay"));
    assert!(lines[2].contains("Sparrow"));
}

#[test]
fn rendered_names_are_escaped() -> Result<()> {
    let species = vec![Species::new(9, "<Tom & \"Jerry\">", "T&J")];
    let html = render_bird_list(&species, &WidgetConfig::default());
    let dom = Dom::parse(&html)?;

    let toggle = dom.by_id("bird-9").expect("toggle rendered");
    assert_eq!(dom.value(toggle), Some("T&J"));
    let label = dom.query_selector("label[for=bird-9]")?.expect("label rendered");
    assert_eq!(dom.text_content(label), "<Tom & \"Jerry\">");
    Ok(())
}

#[test]
fn rendered_list_mounts_with_a_custom_config() -> Result<()> {
    let config = WidgetConfig::from_toml_str(
        r#"
        input_id = "speciesSearch"
        list_id = "speciesList"
        row_class = "species-row"
        "#,
    )?;
    let species = vec![
        Species::new(1, "Robin", "AMRO"),
        Species::new(2, "Blue Jay", "BLJA"),
    ];

    let mut page = Page::from_html(&render_bird_list(&species, &config))?;
    page.mount(config)?;
    page.type_text("#speciesSearch", "ROB")?;

    assert_eq!(page.visible_labels()?, vec!["Robin".to_string()]);
    assert_eq!(page.row_labels()?, vec!["Blue Jay".to_string(), "Robin".to_string()]);
    Ok(())
}
