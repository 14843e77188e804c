use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REVOLUT_STATEMENT: &str = "\
Type,Product,Started Date,Completed Date,Description,Amount,Fee,Currency,State,Balance
CARD_PAYMENT,Current,2025-03-02 09:10:00,2025-03-02 09:10:04,Migros Bern,-20.00,0.00,CHF,COMPLETED,480.00
CARD_PAYMENT,Current,2025-03-05 20:01:00,2025-03-05 20:01:02,Kino Rex,-18.50,0.00,CHF,COMPLETED,461.50
";

fn spendwise(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("spendwise").unwrap();
    cmd.env("SPENDWISE_DATA_DIR", data_dir).env_remove("RUST_LOG");
    cmd
}

fn initialized() -> TempDir {
    let temp = TempDir::new().unwrap();
    spendwise(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 14 starter categories."));
    temp
}

#[test]
fn init_seeds_categories_once() {
    let temp = initialized();

    spendwise(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("categories left unchanged"));

    spendwise(temp.path())
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Groceries").and(predicate::str::contains("Dining Out")));
}

#[test]
fn add_list_and_summarize_transactions() {
    let temp = initialized();

    spendwise(temp.path())
        .args(["txn", "add", "-12.50", "Coop Pronto", "--date", "2025-03-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Expense: CHF -12.50 Coop Pronto"))
        .stdout(predicate::str::contains("Category: Groceries"));

    spendwise(temp.path())
        .args(["transaction", "add", "3200", "Salary", "--date", "2025-03-25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Category: Miscellaneous"));

    spendwise(temp.path())
        .args(["transaction", "list", "--month", "2025-03", "--type", "expense"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Coop Pronto"))
        .stdout(predicate::str::contains("1 transaction(s)"));

    spendwise(temp.path())
        .args(["summary", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary for March 2025"))
        .stdout(predicate::str::contains("Groceries"));
}

#[test]
fn category_in_use_cannot_be_deleted() {
    let temp = initialized();

    spendwise(temp.path())
        .args(["txn", "add", "-40", "Migros", "--date", "2025-01-10"])
        .assert()
        .success();

    spendwise(temp.path())
        .args(["category", "delete", "Groceries"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still used by 1 transaction(s)"));

    spendwise(temp.path())
        .args(["category", "delete", "Groceries", "--reassign-to", "Miscellaneous"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 transaction(s) moved to Miscellaneous"));
}

#[test]
fn categorizer_test_command() {
    let temp = initialized();

    spendwise(temp.path())
        .args(["category", "test", "SBB Billett Zürich"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-> Transportation"));

    spendwise(temp.path())
        .args(["category", "test", "Qwxz Vlk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no keyword matched"));
}

#[test]
fn csv_import_dry_run_then_import_skips_duplicates() {
    let temp = initialized();
    let statement = temp.path().join("revolut.csv");
    fs::write(&statement, REVOLUT_STATEMENT).unwrap();
    let statement = statement.to_str().unwrap();

    spendwise(temp.path())
        .args(["import", "csv", statement, "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Revolut"))
        .stdout(predicate::str::contains("2 new, 0 duplicate(s), 0 error(s)"))
        .stdout(predicate::str::contains("Dry run"));

    spendwise(temp.path())
        .args(["import", "csv", statement])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 transaction(s)"));

    spendwise(temp.path())
        .args(["import", "csv", statement])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 0 transaction(s)"))
        .stdout(predicate::str::contains("Skipped 2 duplicate(s)"));
}

#[test]
fn unrecognized_statement_needs_format() {
    let temp = initialized();
    let statement = temp.path().join("mystery.csv");
    fs::write(&statement, "foo,bar\n1,2\n").unwrap();

    spendwise(temp.path())
        .args(["import", "csv", statement.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--format"));
}

#[test]
fn budgets_track_spending() {
    let temp = initialized();

    spendwise(temp.path())
        .args(["txn", "add", "-120", "Migros", "--date", "2025-03-04"])
        .assert()
        .success();

    spendwise(temp.path())
        .args(["budget", "set", "Groceries", "100", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set Groceries budget for March 2025 to CHF 100.00"));

    spendwise(temp.path())
        .args(["budget", "over", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Groceries"))
        .stdout(predicate::str::contains("CHF 20.00 over"));

    spendwise(temp.path())
        .args(["budget", "set", "Groceries", "0", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed Groceries budget"));
}

#[test]
fn delete_all_requires_confirmation() {
    let temp = initialized();

    spendwise(temp.path())
        .args(["txn", "add", "-5", "Coffee", "--date", "2025-02-01"])
        .assert()
        .success();

    spendwise(temp.path())
        .args(["txn", "delete-all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));

    spendwise(temp.path())
        .args(["txn", "delete-all", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 transaction(s)."));
}

#[test]
fn unknown_transaction_is_an_error() {
    let temp = initialized();

    spendwise(temp.path())
        .args(["txn", "show", "txn-deadbeef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn export_and_backup() {
    let temp = initialized();
    spendwise(temp.path())
        .args(["txn", "add", "-9.90", "Netflix", "--date", "2025-02-11"])
        .assert()
        .success();

    let yaml_path = temp.path().join("export.yaml");
    spendwise(temp.path())
        .args(["export", "all", yaml_path.to_str().unwrap(), "--format", "yaml"])
        .assert()
        .success();
    let yaml = fs::read_to_string(&yaml_path).unwrap();
    assert!(yaml.starts_with("# Spendwise data export"));
    assert!(yaml.contains("Netflix"));

    let csv_path = temp.path().join("transactions.csv");
    spendwise(temp.path())
        .args(["export", "transactions", csv_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 transaction(s)"));

    spendwise(temp.path())
        .args(["backup", "create"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created"));

    spendwise(temp.path())
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 backup(s)"));

    spendwise(temp.path())
        .args(["backup", "restore", "latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn decimal_comma_expense_amounts() {
    let temp = initialized();

    spendwise(temp.path())
        .args(["txn", "add", "-12,50", "Coop Bern", "--date", "2025-03-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Expense: CHF -12.50 Coop Bern"));

    spendwise(temp.path())
        .args(["txn", "delete-last"])
        .assert()
        .success();

    spendwise(temp.path())
        .args(["txn", "add", "-3,20", "Kiosk", "--date", "2025-03-05"])
        .assert()
        .success();

    spendwise(temp.path())
        .args(["txn", "list", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kiosk"))
        .stdout(predicate::str::contains("Coop Bern").not());
}

#[test]
fn restore_after_fresh_init_keeps_data_readable() {
    let temp = initialized();

    spendwise(temp.path())
        .args(["backup", "create"])
        .assert()
        .success();

    spendwise(temp.path())
        .args(["backup", "restore", "latest", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 0 transaction(s), 14 category(ies), 0 budget(s)"));

    spendwise(temp.path())
        .args(["budget", "show"])
        .assert()
        .success();

    spendwise(temp.path())
        .args(["txn", "add", "-7", "Migros", "--date", "2025-03-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Category: Groceries"));
}
