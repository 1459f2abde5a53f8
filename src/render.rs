use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::*;

/// One bird species as listed on the map page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    #[serde(alias = "speciesID")]
    pub species_id: i64,
    pub species: String,
    pub birdcode: String,
}

impl Species {
    pub fn new(species_id: i64, species: impl Into<String>, birdcode: impl Into<String>) -> Self {
        Self {
            species_id,
            species: species.into(),
            birdcode: birdcode.into(),
        }
    }
}

fn sorted_by_name(species: &[Species]) -> Vec<&Species> {
    let mut sorted = species.iter().collect::<Vec<_>>();
    sorted.sort_by(|left, right| {
        left.species
            .cmp(&right.species)
            .then(left.species_id.cmp(&right.species_id))
    });
    sorted
}

/// Renders the `<li>` rows for `species`, ordered by species name.
pub fn render_bird_rows(species: &[Species], config: &WidgetConfig) -> String {
    let class = escape_html_attr_for_serialization(&config.row_class);
    let mut out = String::new();
    for bird in sorted_by_name(species) {
        let code = escape_html_attr_for_serialization(&bird.birdcode);
        let _ = writeln!(
            out,
            "<li class=\"{class}\"><input type=\"checkbox\" name=\"bird\" id=\"bird-{id}\" value=\"{code}\"> <label for=\"bird-{id}\">{name}</label></li>",
            id = bird.species_id,
            name = escape_html_text_for_serialization(&bird.species),
        );
    }
    out
}

/// Renders the search input, the bulk selection controls and the list, with
/// the ids `config` expects.
pub fn render_bird_list(species: &[Species], config: &WidgetConfig) -> String {
    let attr = escape_html_attr_for_serialization;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<input type=\"text\" id=\"{}\" placeholder=\"Search for birds..\">",
        attr(&config.input_id)
    );
    let _ = writeln!(
        out,
        "<button type=\"button\" id=\"{}\">Select All</button>",
        attr(&config.select_all_id)
    );
    let _ = writeln!(
        out,
        "<button type=\"button\" id=\"{}\">Deselect All</button>",
        attr(&config.deselect_all_id)
    );
    let _ = writeln!(out, "<ul class=\"list-group\" id=\"{}\">", attr(&config.list_id));
    out.push_str(&render_bird_rows(species, config));
    out.push_str("</ul>\n");
    out
}
