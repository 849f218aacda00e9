//! End-to-End Tests for the merge pipeline
//!
//! These tests lay out a repository on disk and run the whole pass:
//! 1. Module discovery
//! 2. Ingestion of extraction, recorded and candidate files
//! 3. Replay of the previous memory file
//! 4. Rendering and in-place rewrite

use mod_translation_core::{
    DiagnosticKind, MergeConfig, MergePipeline, DEFAULT_MISSING_ORIGINAL,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FIXTURE_EN: &str = include_str!("fixtures/EN_output.txt");
const FIXTURE_CN: &str = include_str!("fixtures/CN_output.txt");
const FIXTURE_COMPLETED: &str = include_str!("fixtures/en_completed.txt");
const FIXTURE_MEMORY: &str = include_str!("fixtures/translations_CN.txt");

const MODULE_ID: &str = "2392709985";

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().expect("fixture path has a parent")).unwrap();
    fs::write(path, content).unwrap();
}

/// Build the repository layout with every fixture in place.
fn repo_with_fixtures() -> TempDir {
    let repo = TempDir::new().unwrap();
    let root = repo.path();
    let module_dir = root.join("data/output_files/Better_Sorting_2392709985");

    fs::create_dir_all(root.join("translation_utils")).unwrap();
    write(&module_dir.join("EN_output.txt"), FIXTURE_EN);
    write(&module_dir.join("CN_output.txt"), FIXTURE_CN);
    write(
        &root.join("data/completed_files/2392709985/en_completed.txt"),
        FIXTURE_COMPLETED,
    );
    write(&root.join("data/translations_CN.txt"), FIXTURE_MEMORY);
    repo
}

fn memory(root: &Path) -> String {
    fs::read_to_string(root.join("data/translations_CN.txt")).unwrap()
}

/// Test the complete pass against the fixture repository
#[test]
fn test_e2e_first_pass() {
    let repo = repo_with_fixtures();
    fs::create_dir_all(repo.path().join("data/output_files/scratch")).unwrap();

    let report = MergePipeline::new(repo.path(), MergeConfig::default())
        .run()
        .expect("merge should not fail");

    // 1. Diagnostics: one broken line, one badly named directory
    assert_eq!(report.error_count(), 2);
    let format_error = report
        .diagnostics
        .iter()
        .find(|d| d.kind == DiagnosticKind::Format)
        .expect("format error reported");
    assert!(format_error.file.ends_with("EN_output.txt"));
    assert_eq!(format_error.line, Some(6));
    assert_eq!(format_error.message, "this line is broken");
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::MalformedModuleDir && d.file == "scratch"));

    // 2. Output written in place, even though errors were found
    let expected = format!(
        "\n------ {id} :: Better_Sorting ------\n\n\
// keep the brand name untranslated?\n\
{id}::EN::IGUI_BetterSorting_Title = \"Better Sorting\",\n\
{id}::CN::IGUI_BetterSorting_Title = \"更好的排序（校对）\",\n\
\t\t// description changed upstream\n\
\t\t{id}::EN::IGUI_BetterSorting_Desc = \"Sorts your items by category\",\n\
\t\t{id}::CN::IGUI_BetterSorting_Desc = \"按类别排序\",\n\
{id}::EN::Tooltip_BetterSorting_Weight = \"Total weight: %1\",\n\
{id}::CN::Tooltip_BetterSorting_Weight = \"总重量：%1\",\n\
\t\t{id}::EN::IGUI_BetterSorting_Removed = \"{missing}\",\n\
\t\t{id}::CN::IGUI_BetterSorting_Removed = \"已删除的条目\",\n\
\n",
        id = MODULE_ID,
        missing = DEFAULT_MISSING_ORIGINAL
    );
    assert_eq!(memory(repo.path()), expected);
    assert_eq!(report.output, expected);

    // 3. Per-module bookkeeping
    let module = &report.modules[0];
    assert_eq!(module.id, MODULE_ID);
    assert_eq!(module.name, "Better_Sorting");
    assert_eq!(module.diagnostics, 1);
    assert_eq!(report.rendered.entries, 4);
    assert_eq!(report.rendered.pending, 2);
}

/// Test that repeated runs settle and then stay byte-identical
#[test]
fn test_e2e_reruns_are_stable() {
    let repo = repo_with_fixtures();
    let pipeline = MergePipeline::new(repo.path(), MergeConfig::default());

    pipeline.run().unwrap();
    pipeline.run().unwrap();
    let second = memory(repo.path());
    pipeline.run().unwrap();
    let third = memory(repo.path());

    assert_eq!(second, third);
    assert_eq!(second.matches("// keep the brand name untranslated?").count(), 1);
    assert_eq!(second.matches("// description changed upstream").count(), 1);
}

/// Test a repository that has never been merged before
#[test]
fn test_e2e_bootstrap_without_memory_file() {
    let repo = TempDir::new().unwrap();
    let root = repo.path();
    let module_dir = root.join("data/output_files/Loot_1");
    write(&module_dir.join("EN_output.txt"), "\u{feff}Loot_Name = \"Loot\",\r\n");
    write(&module_dir.join("CN_output.txt"), "");

    let report = MergePipeline::new(root, MergeConfig::default()).run().unwrap();

    // the candidate file is missing, everything else went through
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::MissingCompanionFile);
    assert_eq!(
        memory(root),
        "\n------ 1 :: Loot ------\n\n\t\t1::EN::Loot_Name = \"Loot\",\n\t\t1::CN::Loot_Name = \"\",\n\n"
    );
}

/// Test the optional backup of the previous memory file
#[test]
fn test_e2e_backup_keeps_previous_memory() {
    let repo = repo_with_fixtures();
    let mut config = MergeConfig::default();
    config.memory.backup = true;

    let report = MergePipeline::new(repo.path(), config).run().unwrap();

    let written = report.written.expect("memory written");
    let backup = written.backup_path.expect("backup created");
    assert_eq!(fs::read_to_string(backup).unwrap(), FIXTURE_MEMORY);
}

/// Test custom language tags and file names from YAML
#[test]
fn test_e2e_custom_layout() {
    let repo = TempDir::new().unwrap();
    let root = repo.path();
    let config = MergeConfig::from_yaml(
        "layout:\n  dataDir: loc\n  memoryFile: translations_KO.txt\n  recordedFile: KO_output.txt\nmemory:\n  tags:\n    target: KO\n",
    )
    .unwrap();

    let module_dir = root.join("loc/output_files/Mod_5");
    write(&module_dir.join("EN_output.txt"), "K = \"Key\",\n");
    write(&module_dir.join("KO_output.txt"), "K = \"열쇠\",\n");
    write(&root.join("loc/completed_files/5/en_completed.txt"), "");
    write(
        &root.join("loc/translations_KO.txt"),
        "5::EN::K = \"Key\",\n5::KO::K = \"키\",\n",
    );

    let report = MergePipeline::new(root, config).run().unwrap();

    assert!(report.is_clean());
    assert_eq!(
        fs::read_to_string(root.join("loc/translations_KO.txt")).unwrap(),
        "\n------ 5 :: Mod ------\n\n5::EN::K = \"Key\",\n5::KO::K = \"키\",\n\n"
    );
}
