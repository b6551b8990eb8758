use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use shapediff_diff::{DiffConfig, DiffReport, TextLine};
use shapediff_value::Value;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let report = match cli.command {
        Command::Strict(args) => compare_files(&args.a, &args.b, &DiffConfig::strict())?,
        Command::Similar(args) => {
            let config = if args.unordered {
                DiffConfig::tolerant_unordered()
            } else {
                DiffConfig::tolerant()
            };
            compare_files(&args.a, &args.b, &config)?
        }
    };

    match cli.format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if report.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn load(path: &Path) -> anyhow::Result<Value> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Value::from_json_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

fn compare_files(a: &Path, b: &Path, config: &DiffConfig) -> anyhow::Result<DiffReport> {
    let (va, vb) = (load(a)?, load(b)?);
    debug!(a = %a.display(), b = %b.display(), mode = ?config.mode, "comparing");
    Ok(config.report(&va, &vb))
}

fn render_text(report: &DiffReport) -> String {
    let mut out = String::new();
    if report.is_empty() {
        out.push_str(&format!("{} Values match\n", "✓".green().bold()));
        return out;
    }

    for diff in report.diffs() {
        out.push_str(&format!(
            "{} {}\n",
            format!("[{}]", diff.path_string()).yellow(),
            diff.cause.kind().bold()
        ));
        for line in diff.cause.to_string().lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }

    for (diff, hunks) in report.text_hunks() {
        out.push_str(&format!("\n{} {}\n", "text diff at".dimmed(), diff.path_string().yellow()));
        for hunk in hunks {
            out.push_str(&format!(
                "{}\n",
                format!(
                    "@@ -{},{} +{},{} @@",
                    hunk.a_start, hunk.a_count, hunk.b_start, hunk.b_count
                )
                .cyan()
            ));
            for line in hunk.lines {
                let rendered = match line {
                    TextLine::Context(text) => format!(" {text}").normal(),
                    TextLine::OnlyA(text) => format!("-{text}").red(),
                    TextLine::OnlyB(text) => format!("+{text}").green(),
                };
                out.push_str(&format!("{rendered}\n"));
            }
        }
    }

    let counts: Vec<String> = report
        .counts()
        .into_iter()
        .map(|(kind, n)| format!("{n} {kind}"))
        .collect();
    out.push_str(&format!(
        "\n{} {} difference(s): {}\n",
        "✗".red().bold(),
        report.len(),
        counts.join(", ")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapediff_diff::Cause;
    use std::path::PathBuf;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn strict_reports_changed_leaf() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.json", r#"{"name": "x", "tags": ["a", "b"]}"#);
        let b = write(&dir, "b.json", r#"{"name": "x", "tags": ["a", "c"]}"#);

        let report = compare_files(&a, &b, &DiffConfig::strict()).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.diffs()[0].path, ["[tags]", "[dyn]", "[1]", "[dyn]"]);
    }

    #[test]
    fn similar_unordered_accepts_permutations() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.json", r#"{"ids": [1, 2, 3]}"#);
        let b = write(&dir, "b.json", r#"{"ids": [3, 1, 2]}"#);

        assert_eq!(compare_files(&a, &b, &DiffConfig::tolerant()).unwrap().len(), 3);
        assert!(compare_files(&a, &b, &DiffConfig::tolerant_unordered())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_keys_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.json", r#"{"x": 1}"#);
        let b = write(&dir, "b.json", r#"{"y": 1}"#);

        let report = compare_files(&a, &b, &DiffConfig::tolerant()).unwrap();
        let causes: Vec<&Cause> = report.diffs().iter().map(|d| &d.cause).collect();
        assert!(matches!(causes[0], Cause::KeyMissing { on_a: true, .. }));
        assert!(matches!(causes[1], Cause::KeyMissing { on_b: true, .. }));
    }

    #[test]
    fn unreadable_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.json", "{not json");
        let missing = dir.path().join("missing.json");

        let err = compare_files(&a, &a, &DiffConfig::strict()).unwrap_err();
        assert!(err.to_string().contains("a.json"));
        let err = compare_files(&missing, &a, &DiffConfig::strict()).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn text_rendering() {
        colored::control::set_override(false);

        let same = DiffConfig::strict().report(&Value::from(1i64), &Value::from(1i64));
        assert_eq!(render_text(&same), "✓ Values match\n");

        let report = DiffConfig::strict().report(
            &Value::from("one\ntwo\n"),
            &Value::from("one\nthree\n"),
        );
        let text = render_text(&report);
        assert!(text.starts_with("[] value\n  values diff\n  A=one\n"));
        assert!(text.contains("@@ -1,2 +1,2 @@"));
        assert!(text.contains("\n-two\n+three\n"));
        assert!(text.ends_with("1 difference(s): 1 value\n"));
    }
}
