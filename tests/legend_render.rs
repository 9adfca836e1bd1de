use std::sync::Arc;

use mapclass_rs::models::Row;
use mapclass_rs::paint::InMemoryLayers;
use mapclass_rs::viz::{self, LegendBody, legend_height_px};
use mapclass_rs::{
    ClassMethod, ClassifyConfig, ResultSet, StyleMode, StyleSession, StyleSettings, Value,
};
use tempfile::tempdir;

fn results() -> Arc<ResultSet> {
    let rows = (0..40)
        .map(|i| {
            let mut r = Row::new();
            r.insert("population".into(), Value::Int(1_000 * i * i));
            r.insert("region".into(), Value::Text(format!("R{}", i % 23)));
            r
        })
        .collect();
    Arc::new(ResultSet::new(vec!["population".into(), "region".into()], rows))
}

#[test]
fn graduated_legend_svg_lists_every_class() {
    let mut session = StyleSession::new(results(), ClassifyConfig::default()).with_locale("de");
    let settings = session.graduated_settings("population", ClassMethod::NaturalBreaks, 4);
    session.update_settings(settings);
    let legend = session.apply(&mut InMemoryLayers::default());
    let LegendBody::Graduated(g) = &legend.body else {
        panic!("expected graduated legend");
    };
    assert_eq!(g.rows.len(), 4);
    assert_eq!(g.rows.iter().map(|r| r.count).sum::<usize>(), 40);

    let dir = tempdir().unwrap();
    let out = dir.path().join("legend.svg");
    viz::draw_legend_svg(&legend, &out, 320, 100).unwrap();
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("population"));
    assert!(svg.contains(&g.rows[0].label));
    assert!(svg.contains(&format!("height=\"{}\"", legend_height_px(&legend))));
}

#[test]
fn categorical_legend_svg_has_other_row_and_hidden_state() {
    let mut session = StyleSession::new(results(), ClassifyConfig::default());
    session.update_settings(StyleSettings {
        mode: StyleMode::Categorical,
        column: Some("region".into()),
        ..StyleSettings::default()
    });
    let mut layers = InMemoryLayers::default();
    session.apply(&mut layers);
    session.toggle_category("R3", &mut layers);

    let legend = session.legend();
    let LegendBody::Categorical { rows } = &legend.body else {
        panic!("expected categorical legend");
    };
    assert_eq!(rows.len(), 21);
    assert_eq!(rows[20].label, "Other (3 values)");
    assert!(!rows[3].visible);

    let dir = tempdir().unwrap();
    let out = dir.path().join("cat.svg");
    viz::draw_legend_svg(&legend, &out, 280, 200).unwrap();
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("Other (3 values)"));
}

#[test]
fn single_mode_preview_is_one_swatch() {
    let session = StyleSession::new(results(), ClassifyConfig::default());
    let legend = session.preview();
    assert_eq!(legend.row_count(), 1);
    assert!(!legend.is_interactive());
    let dir = tempdir().unwrap();
    let out = dir.path().join("single.svg");
    viz::draw_legend_svg(&legend, &out, 240, 80).unwrap();
    assert!(out.exists());
}
