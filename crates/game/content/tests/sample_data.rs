//! The data directory shipped with the workspace must load and build its roster.

use std::path::PathBuf;

use game_content::ContentFactory;
use game_core::{ContentOracle, SchedulerMode};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../data")
}

#[test]
fn shipped_content_is_consistent() {
    let factory = ContentFactory::new(data_dir());

    let config = factory.load_config().unwrap();
    assert_eq!(config.scheduler, SchedulerMode::RoundRobin);

    let data = factory.load_data_manager().unwrap();
    let dangling = data.dangling_references();
    assert!(dangling.is_empty(), "dangling references: {dangling:?}");

    let v1 = data.spell("fireball").unwrap();
    let v2 = data.spell("fireball@v2").unwrap();
    assert_eq!(v2.name, v1.name);
    assert!(v2.can_crit);
    assert!(v2.cost.amount > v1.cost.amount);
    assert_eq!(v2.ultimate_charge, v1.ultimate_charge);

    let roster = factory.load_roster("roster.ron").unwrap();
    let plans = data.plan_roster(&roster).unwrap();
    assert_eq!(plans.len(), 6);
    assert_eq!(plans[3].name, "Sszara");
}
