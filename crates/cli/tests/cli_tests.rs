// End-to-end tests: run the built binary against the fixture files.
// Run with: cargo test -p multimarca-cli --test cli_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn multimarca() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_multimarca"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn run(args: &[&str]) -> Output {
    multimarca().args(args).output().expect("spawn multimarca")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\nstdout:\n{stdout}"))
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Write a config into `dir` whose data files point at the fixtures.
fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("ciclo.toml");
    let body = body.replace("{fixtures}", &fixture("").display().to_string());
    std::fs::write(&path, body).unwrap();
    path
}

// ===========================================================================
// run
// ===========================================================================

#[test]
fn run_json_classifies_fixture_cycle() {
    let output = run(&["run", "tests/fixtures/ciclo.toml", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json = stdout_json(&output);
    assert_eq!(json["name"], "Fechamento 202401");
    assert!(json["generatedAt"].is_string());
    assert_eq!(json["success"], true);

    let resellers = json["resellers"].as_array().unwrap();
    assert_eq!(resellers.len(), 4);
    assert_eq!(resellers[0]["nomeRevendedora"], "Ana Souza");
    assert_eq!(resellers[0]["classification"], "Multimarca");
    assert_eq!(resellers[0]["brandsPurchased"], serde_json::json!(["oBoticário", "Eudora"]));
    assert_eq!(resellers[1]["classification"], "Mono-marca");
    assert_eq!(resellers[2]["matchedBy"], "nome");
    assert_eq!(resellers[3]["setor"], "Sem Setor");
    assert_eq!(resellers[3]["classification"], "Sem marca");

    let audit = &json["audit"];
    assert_eq!(audit["cicloSelecionado"], "202401");
    assert_eq!(audit["matchedByCodigo"], 2);
    assert_eq!(audit["matchedByNome"], 1);
    assert_eq!(audit["semMarca"], 1);
    assert_eq!(audit["totalPorMarca"]["oBoticário"], 2);
    assert_eq!(audit["totalPorMarca"]["Eudora"], 2);

    let sectors: Vec<&str> = json["sectorSummaries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["setor"].as_str().unwrap())
        .collect();
    assert_eq!(sectors, vec!["Norte", "Sem Setor", "Sul"]);

    let err = stderr(&output);
    assert!(err.contains("4 active accounts in cycle 202401"), "stderr: {err}");
}

#[test]
fn cycle_flag_overrides_config() {
    let output = run(&["run", "tests/fixtures/ciclo.toml", "--cycle", "all", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json = stdout_json(&output);
    assert_eq!(json["audit"]["totalAtivos"], 5);
    assert_eq!(json["audit"]["cicloSelecionado"], "ALL");
    assert_eq!(json["audit"]["totalPorMarca"]["oBoticário"], 3);
}

#[test]
fn unknown_cycle_exits_6_with_empty_result() {
    let output = run(&["run", "tests/fixtures/ciclo.toml", "--cycle", "209912", "--json"]);
    assert_eq!(output.status.code(), Some(6));
    let json = stdout_json(&output);
    assert_eq!(json["success"], false);
    assert!(json["resellers"].as_array().unwrap().is_empty());
    assert!(stderr(&output).contains("no active accounts found for cycle 209912"));
}

#[test]
fn output_flag_writes_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("resultado.json");
    let output = run(&["run", "tests/fixtures/ciclo.toml", "--output", out.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty(), "stdout must stay empty without --json");

    let text = std::fs::read_to_string(&out).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["audit"]["totalAtivos"], 4);
}

#[test]
fn export_dir_writes_csv_tables() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&[
        "run",
        "tests/fixtures/ciclo.toml",
        "--export-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let summary = std::fs::read_to_string(dir.path().join("resumo_por_setor.csv")).unwrap();
    let mut lines = summary.lines();
    assert_eq!(
        lines.next(),
        Some("Setor,Ativos,Multimarca,% Multimarca,Mono-marca,% Mono-marca,Sem marca,% Sem marca")
    );
    assert_eq!(lines.next(), Some("Norte,1,1,100.00%,0,0.00%,0,0.00%"));

    let details = std::fs::read_to_string(dir.path().join("revendedoras.csv")).unwrap();
    assert!(details.contains("oBoticário; Eudora"));
    assert!(details.contains("N/A"));

    let sem_marca = std::fs::read_to_string(dir.path().join("sem_marca_ciclo_202401.csv")).unwrap();
    assert_eq!(sem_marca, "Código,Nome,Setor\n400,Eva Rocha,Sem Setor\n");
}

#[test]
fn export_dir_writes_xlsx_tables() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&[
        "run",
        "tests/fixtures/ciclo.toml",
        "--cycle",
        "ALL",
        "--export-dir",
        dir.path().to_str().unwrap(),
        "--format",
        "xlsx",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    for name in ["resumo_por_setor.xlsx", "revendedoras.xlsx", "sem_marca_ciclo_ALL.xlsx"] {
        let path = dir.path().join(name);
        assert!(path.exists(), "missing {name}");
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}

#[test]
fn sector_flag_exports_one_sector_sorted_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&[
        "run",
        "tests/fixtures/ciclo.toml",
        "--export-dir",
        dir.path().to_str().unwrap(),
        "--sector",
        "sul",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let details = std::fs::read_to_string(dir.path().join("detalhes_Sul.csv")).unwrap();
    let names: Vec<&str> = details.lines().skip(1).map(|l| l.split(',').nth(1).unwrap()).collect();
    assert_eq!(names, vec!["Bruno Lima", "Carla Dias"]);
    assert!(!details.contains("Ana Souza"));
    assert!(dir.path().join("revendedoras.csv").exists());
}

#[test]
fn unknown_sector_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&[
        "run",
        "tests/fixtures/ciclo.toml",
        "--export-dir",
        dir.path().to_str().unwrap(),
        "--sector",
        "Oeste",
    ]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("Oeste"), "stderr: {err}");
    assert!(err.contains("Norte, Sem Setor, Sul"), "stderr: {err}");
}

#[test]
fn sector_flag_without_export_dir_is_usage_error() {
    let output = run(&["run", "tests/fixtures/ciclo.toml", "--sector", "Sul"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--export-dir"));
}

// ===========================================================================
// Config and mapping errors
// ===========================================================================

#[test]
fn unknown_brand_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
name = "x"
[master]
file = "{fixtures}/geral.csv"
[brands.natura]
file = "{fixtures}/eudora.csv"
"#,
    );
    let output = run(&["validate", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("unknown brand"));
}

#[test]
fn missing_data_file_exits_4() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
name = "x"
[master]
file = "nao-existe.csv"
"#,
    );
    let output = run(&["run", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("nao-existe.csv"));
}

#[test]
fn missing_config_exits_4() {
    let output = run(&["run", "tests/fixtures/nao-existe.toml"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn mapped_column_absent_exits_5() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
name = "x"
[master]
file = "{fixtures}/geral.csv"
[master.columns]
codigo_revendedora = "Código"
nome_revendedora = "Nome"
setor = "Regional"
ciclo_faturamento = "Ciclo"
"#,
    );
    let output = run(&["run", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(5));
    let err = stderr(&output);
    assert!(err.contains("Regional"), "stderr: {err}");
    assert!(err.contains("available columns"), "stderr: {err}");
}

#[test]
fn unmappable_brand_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
name = "x"
cycle = "202401"
[master]
file = "{fixtures}/geral.csv"
[master.columns]
codigo_revendedora = "Código"
nome_revendedora = "Nome"
setor = "Setor"
ciclo_faturamento = "Ciclo"
[brands.qdb]
file = "{fixtures}/geral.csv"
"#,
    );
    let output = run(&["run", config.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json = stdout_json(&output);
    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("QDB"));
    assert_eq!(json["audit"]["semMarca"], 4);
}

#[test]
fn explicit_brand_mapping_without_tipo_skips_brand() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
name = "x"
cycle = "202401"
[master]
file = "{fixtures}/geral.csv"
[master.columns]
codigo_revendedora = "Código"
nome_revendedora = "Nome"
setor = "Setor"
ciclo_faturamento = "Ciclo"
[brands.oboticario]
file = "{fixtures}/boticario.csv"
[brands.oboticario.columns]
codigo_revendedora = "CodigoRevendedora"
nome_revendedora = "NomeRevendedora"
tipo = "Tipo"
ciclo_faturamento = "CicloFaturamento"
[brands.eudora]
file = "{fixtures}/eudora.csv"
[brands.eudora.columns]
codigo_revendedora = "Cod"
nome_revendedora = "Revendedora"
ciclo_faturamento = "Ciclo"
"#,
    );
    let output = run(&["run", config.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json = stdout_json(&output);
    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("Eudora"));
    assert_eq!(json["audit"]["totalPorMarca"]["oBoticário"], 2);
}

#[test]
fn validate_reports_datasets() {
    let output = run(&["validate", "tests/fixtures/ciclo.toml"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("valid: 'Fechamento 202401'"), "stderr: {err}");
    assert!(err.contains("Eudora: 3 rows, mapped"), "stderr: {err}");
}

// ===========================================================================
// cycles / map
// ===========================================================================

#[test]
fn cycles_lists_newest_first() {
    let output = run(&["cycles", "tests/fixtures/geral.csv"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "202402\n202401\n");

    let output = run(&["cycles", "tests/fixtures/boticario.csv", "--column", "CicloFaturamento", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout_json(&output), serde_json::json!(["202402", "202401"]));
}

#[test]
fn cycles_unknown_column_exits_5() {
    let output = run(&["cycles", "tests/fixtures/geral.csv", "--column", "Periodo"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn map_prints_toml_proposal() {
    let output = run(&["map", "tests/fixtures/eudora.csv"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#"codigo_revendedora = "Cod""#), "stdout: {stdout}");
    assert!(stdout.contains(r#"nome_revendedora = "Revendedora""#), "stdout: {stdout}");
    assert!(stdout.contains(r#"ciclo_faturamento = "Ciclo""#), "stdout: {stdout}");

    let output = run(&["map", "tests/fixtures/eudora.csv", "--master"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stdout).contains("[master.columns]"));
    assert!(stderr(&output).contains("setor"));
}

#[test]
fn no_subcommand_is_usage_error() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(2));
}
