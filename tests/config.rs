#![cfg(feature = "config-toml")]

use anyhow::Result;
use ironsweep::testing::TempFilePath;
use ironsweep::{EnvParams, JobConfig, ParameterSource, parse_parent_ids};

#[test]
fn missing_config_file_gives_defaults() -> Result<()> {
    let cfg = JobConfig::load(std::path::Path::new("/no/such/ironsweep.toml"))?;
    assert_eq!(cfg, JobConfig::default());
    Ok(())
}

#[test]
fn config_file_is_loaded_and_validated() -> Result<()> {
    let tmp = TempFilePath::with_extension("toml")?;
    std::fs::write(
        tmp.path(),
        "parent_kind = \"SalesOrd\"\npage_size = 250\n\n[rule]\nsubtype_a = \"ItemShip\"\nsubtype_b = \"CustInvc\"\n",
    )?;
    let cfg = JobConfig::load(tmp.path())?;
    assert_eq!(cfg.parent_kind, "SalesOrd");
    assert_eq!(cfg.page_size, 250);
    assert_eq!(cfg.rule.subtype_a, "ItemShip");
    assert_eq!(cfg.rule.max_per_parent, 1);
    Ok(())
}

#[test]
fn invalid_config_file_reports_path() -> Result<()> {
    let tmp = TempFilePath::with_extension("toml")?;
    std::fs::write(tmp.path(), "[rule]\nmax_per_parent = 0\n")?;
    let err = JobConfig::load(tmp.path()).unwrap_err();
    assert!(format!("{err:#}").contains("max_per_parent"));
    Ok(())
}

#[test]
fn env_params_read_variable() -> Result<()> {
    let var = "IRONSWEEP_TEST_PARENT_IDS";
    // SAFETY: no other test reads or writes this variable.
    unsafe { std::env::set_var(var, "RA-3\nRA-3\n\nRA-4") };
    let raw = EnvParams(var.to_string()).raw_parent_ids()?;
    let ids: Vec<String> = parse_parent_ids(&raw).iter().map(ToString::to_string).collect();
    assert_eq!(ids, vec!["RA-3", "RA-4"]);
    assert!(EnvParams("IRONSWEEP_TEST_UNSET_VAR".into()).raw_parent_ids().is_err());
    Ok(())
}
