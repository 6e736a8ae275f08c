use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use tracing::debug;
use vellum_diff::{DiffConfig, Differ, TextMarkPolicy};
use vellum_model::{Node, Schema};

use crate::cli::*;
use crate::render::{render, DiffStats};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let output = match cli.command {
        Command::Diff(args) => cmd_diff(&args, cli.format)?,
        Command::Validate(args) => cmd_validate(&args, cli.format)?,
        Command::Schema(args) => cmd_schema(&args)?,
    };
    print!("{output}");
    Ok(())
}

fn cmd_diff(args: &DiffArgs, format: OutputFormat) -> anyhow::Result<String> {
    let schema = load_schema(args.schema.as_deref())?;
    let mut config = load_config(args.config.as_deref())?;
    if args.preserve_marks {
        config.text_marks = TextMarkPolicy::PreserveWithinLeaf;
    }
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm.into();
    }
    debug!(?config, "diff configuration");

    let old = load_document(&schema, &args.old)?;
    let new = load_document(&schema, &args.new)?;
    let differ = Differ::new(schema, config)?;
    let merged = differ.diff_nodes(&old, &new)?;

    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&merged)?)),
        OutputFormat::Text => {
            let stats = DiffStats::of(differ.schema(), &merged);
            let summary = if stats.is_clean() {
                format!("{} No changes.", "✓".green().bold())
            } else {
                format!(
                    "{} inserted, {} deleted, {} unchanged",
                    stats.inserted.to_string().green(),
                    stats.deleted.to_string().red(),
                    stats.unchanged,
                )
            };
            Ok(format!("{}\n{summary}\n", render(differ.schema(), &merged)))
        }
    }
}

fn cmd_validate(args: &ValidateArgs, format: OutputFormat) -> anyhow::Result<String> {
    let schema = load_schema(args.schema.as_deref())?;
    let doc = load_document(&schema, &args.file)?;
    let nodes = doc.node_count();
    let leaves = doc.text_leaves().len();
    Ok(match format {
        OutputFormat::Json => format!(
            "{}\n",
            serde_json::json!({"valid": true, "nodes": nodes, "text_leaves": leaves})
        ),
        OutputFormat::Text => format!(
            "{} {} is valid: {} nodes, {} text leaves\n",
            "✓".green().bold(),
            args.file.display().to_string().bold(),
            nodes,
            leaves,
        ),
    })
}

fn cmd_schema(args: &SchemaArgs) -> anyhow::Result<String> {
    let schema = load_schema(args.schema.as_deref())?;
    Ok(format!("{}\n", serde_json::to_string_pretty(&schema)?))
}

fn load_schema(path: Option<&Path>) -> anyhow::Result<Schema> {
    let Some(path) = path else {
        return Ok(Schema::basic());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading schema {}", path.display()))?;
    let schema = if path.extension().is_some_and(|ext| ext == "toml") {
        Schema::from_toml_str(&raw)
    } else {
        Schema::from_json_str(&raw)
    };
    schema.with_context(|| format!("parsing schema {}", path.display()))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DiffConfig> {
    let Some(path) = path else {
        return Ok(DiffConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    DiffConfig::from_toml_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

fn load_document(schema: &Schema, path: &Path) -> anyhow::Result<Node> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading document {}", path.display()))?;
    schema
        .parse_str(&raw)
        .with_context(|| format!("parsing document {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn diff_args(old: PathBuf, new: PathBuf) -> DiffArgs {
        DiffArgs {
            old,
            new,
            config: None,
            schema: None,
            preserve_marks: false,
            algorithm: None,
        }
    }

    const OLD: &str = r#"{"type": "doc", "content": [
        {"type": "paragraph", "content": [{"type": "text", "text": "Hello. Bye."}]}
    ]}"#;
    const NEW: &str = r#"{"type": "doc", "content": [
        {"type": "paragraph", "content": [{"type": "text", "text": "Hello. Welcome."}]}
    ]}"#;

    #[test]
    fn diff_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let args = diff_args(write(&dir, "old.json", OLD), write(&dir, "new.json", NEW));

        let out = cmd_diff(&args, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let leaves = &value["content"][0]["content"];
        assert_eq!(leaves[0]["text"], "Hello. ");
        assert!(leaves[0].get("marks").is_none());
        assert_eq!(leaves[1]["text"], "Bye.");
        assert_eq!(leaves[1]["marks"][0]["attrs"]["type"], "Deleted");
        assert_eq!(leaves[2]["text"], "Welcome.");
        assert_eq!(leaves[2]["marks"][0]["attrs"]["type"], "Inserted");
    }

    #[test]
    fn diff_text_output_summarizes() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let args = diff_args(write(&dir, "old.json", OLD), write(&dir, "new.json", NEW));

        let out = cmd_diff(&args, OutputFormat::Text).unwrap();
        assert!(out.contains("Hello. Bye.Welcome."));
        assert!(out.contains("1 inserted, 1 deleted, 1 unchanged"));
    }

    #[test]
    fn identical_files_report_no_changes() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let args = diff_args(write(&dir, "a.json", OLD), write(&dir, "b.json", OLD));
        let out = cmd_diff(&args, OutputFormat::Text).unwrap();
        assert!(out.contains("No changes."));
    }

    #[test]
    fn config_file_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = diff_args(write(&dir, "old.json", OLD), write(&dir, "new.json", NEW));
        args.config = Some(write(&dir, "diff.toml", "max_sentence_symbols = 1\n"));

        let err = cmd_diff(&args, OutputFormat::Json).unwrap_err();
        assert!(err.to_string().contains("sentence symbol space exhausted"));
    }

    #[test]
    fn toml_schema_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(
            &dir,
            "schema.toml",
            "[nodes.text]\n[nodes.doc]\n[nodes.paragraph]\n[marks.diffMark]\n",
        );
        let args = ValidateArgs {
            file: write(&dir, "doc.json", OLD),
            schema: Some(schema),
        };
        let out = cmd_validate(&args, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["nodes"], 3);
        assert_eq!(value["text_leaves"], 1);
    }

    #[test]
    fn unknown_node_type_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let args = ValidateArgs {
            file: write(&dir, "doc.json", r#"{"type": "table"}"#),
            schema: None,
        };
        let err = cmd_validate(&args, OutputFormat::Text).unwrap_err();
        assert!(format!("{err:#}").contains("unknown node type: table"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let args = diff_args(PathBuf::from("/nonexistent/old.json"), PathBuf::from("new.json"));
        let err = cmd_diff(&args, OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/old.json"));
    }

    #[test]
    fn schema_prints_json() {
        let out = cmd_schema(&SchemaArgs { schema: None }).unwrap();
        let schema = Schema::from_json_str(&out).unwrap();
        assert_eq!(schema, Schema::basic());
    }
}
