use orchard::{
    engine::{EngineBuilder, EngineSettings},
    report::year_label,
    scenario::ScenarioLoader,
    Species,
};

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn build_engine(seed: u64, horizon_years: u32) -> EngineBuilder {
    let settings = EngineSettings {
        scenario_name: "small_orchard".into(),
        seed,
        horizon_years,
    };
    EngineBuilder::new(settings)
}

#[test]
fn scenario_loader_reads_fixture() {
    let scenario = scenario_loader()
        .load("scenarios/small_orchard.yaml")
        .expect("scenario parses");
    assert_eq!(scenario.name, "small_orchard");
    assert_eq!(scenario.seed, 7);
    assert_eq!(scenario.horizon_years, 14);
    assert_eq!(scenario.orchard.size_acres, 5.0);
    assert_eq!(scenario.orchard.germination.pear, 0.7);
}

#[test]
fn engine_runs_deterministically() {
    let report_a = build_engine(42, 10).build().unwrap().run().unwrap();
    let report_b = build_engine(42, 10).build().unwrap().run().unwrap();
    assert_eq!(report_a, report_b);
}

#[test]
fn different_seeds_change_the_orchard() {
    let reports: Vec<_> = (0..8)
        .map(|seed| build_engine(seed, 8).build().unwrap().run().unwrap())
        .collect();
    let first = &reports[0];
    assert!(reports.iter().any(|report| report.allocation != first.allocation
        || report.total_fruit() != first.total_fruit()));
}

#[test]
fn engine_runs_hook_each_year() {
    let mut engine = build_engine(3, 6).build().unwrap();
    let mut years = Vec::new();
    let report = engine
        .run_with_hook(|summary| years.push((summary.year, summary.total_fruit())))
        .expect("run succeeds");

    assert_eq!(years.len(), 6);
    assert_eq!(years.first().map(|(year, _)| *year), Some(0));
    assert_eq!(years.last().map(|(year, _)| *year), Some(5));
    let hooked_total: u64 = years.iter().map(|(_, fruit)| fruit).sum();
    assert_eq!(hooked_total, report.total_fruit());
}

#[test]
fn tables_cover_every_tree_and_year() {
    let mut engine = build_engine(11, 14).build().unwrap();
    let report = engine.run().unwrap();

    assert_eq!(report.tables.len(), 3);
    for species in Species::ALL {
        let table = report.table(species).expect("table per species");
        assert_eq!(table.tree_count(), report.allocation.tree_count(species));
        assert!(table.tree_count() >= 1);

        let columns = table.columns();
        assert_eq!(columns.len(), 15);
        assert_eq!(columns[0], year_label(0));
        assert_eq!(columns[13], "Year 13");
        assert_eq!(columns[14], "Total");

        for tree in 0..table.tree_count() {
            let row_sum: u64 = table.row(tree).unwrap().iter().sum();
            assert_eq!(table.row_total(tree), Some(row_sum));
        }
    }
}

#[test]
fn young_orchard_bears_no_fruit() {
    let mut engine = build_engine(5, 5).build().unwrap();
    let report = engine.run().unwrap();
    for table in &report.tables {
        for year in 0..3 {
            assert_eq!(table.year_total(year), Some(0), "{} {year}", table.species());
        }
    }
}

#[test]
fn mature_apples_stay_within_yield_range() {
    let mut engine = build_engine(19, 14).build().unwrap();
    let report = engine.run().unwrap();
    let apples = report.table(Species::Apple).unwrap();
    for tree in 0..apples.tree_count() {
        for year in 5..9 {
            let fruit = apples.value(tree, year).unwrap();
            assert!((80..=150).contains(&fruit), "year {year}: {fruit}");
        }
        for year in 9..14 {
            assert!(apples.value(tree, year).unwrap() <= 150);
        }
    }
}

#[test]
fn allocation_percentages_sum_to_one_hundred() {
    for seed in 0..50 {
        let engine = build_engine(seed, 1).build().unwrap();
        let land = engine.allocation().land_percent;
        assert_eq!(land.apple + land.pear + land.plum, 100);
        assert!(land.apple >= 2);
    }
}

#[test]
fn overrides_from_scenario_reach_the_engine() {
    let scenario = scenario_loader()
        .load("scenarios/blighted_orchard.yaml")
        .expect("scenario parses");
    let apple = scenario.profile(Species::Apple);
    assert_eq!(apple.disease_onset_year, 6);
    assert_eq!(apple.disease_severity, 9.0);
    assert_eq!(scenario.profile(Species::Pear), orchard::SpeciesProfile::pear());

    let mut engine = scenario.engine_builder(None, Some(8)).build().unwrap();
    assert_eq!(engine.allocation().seed_density.plum, 1.0);
    assert_eq!(engine.species(Species::Plum).disease_onset_year, 5);
    let report = engine.run().unwrap();
    assert_eq!(report.horizon_years, 8);
    assert_eq!(report.seed, 2024);
}

#[test]
fn json_report_has_labelled_columns() {
    let report = build_engine(2, 4).build().unwrap().run().unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["scenario"], "small_orchard");
    assert_eq!(json["tables"][1]["species"], "pear");
    assert_eq!(json["tables"][0]["columns"][3], "Year 3");
    assert_eq!(json["tables"][0]["columns"][4], "Total");
    let land = &json["allocation"]["land_percent"];
    let sum = land["apple"].as_u64().unwrap()
        + land["pear"].as_u64().unwrap()
        + land["plum"].as_u64().unwrap();
    assert_eq!(sum, 100);
}

#[test]
fn text_report_lists_every_species() {
    let report = build_engine(4, 3).build().unwrap().run().unwrap();
    let text = report.to_string();
    assert!(text.starts_with("Scenario 'small_orchard'"));
    for species in Species::ALL {
        assert!(text.contains(&format!("{species} yield")));
    }
}
