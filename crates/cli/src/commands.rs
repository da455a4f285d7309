//! Command implementations

use crate::RenderArgs;
use anyhow::{Context, bail};
use colored::Colorize;
use std::path::Path;
use walkdir::WalkDir;
use weave_core::Persistable;
use weave_ir::serialization::is_page_file;
use weave_ir::{
    Breakpoint, InMemoryVariables, Page, TableRegistry, Validator, VariableSnapshot, load_page,
    preview_page,
};
use weave_render::{RenderConfig, RenderOptions, RenderSession, Renderer, render_document};

/// Render passes per page: the first queues table fetches, later passes
/// show their results
const MAX_PASSES: usize = 4;

/// Everything a render needs besides the page itself
#[derive(Debug, Default)]
pub struct RenderInputs {
    pub config: RenderConfig,
    pub tables: TableRegistry,
    pub variables: InMemoryVariables,
}

impl RenderInputs {
    pub fn load(args: &RenderArgs) -> anyhow::Result<Self> {
        let config = match &args.config {
            Some(path) => RenderConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RenderConfig::default(),
        };
        let tables = match &args.data {
            Some(path) => TableRegistry::load_from_file(path)
                .with_context(|| format!("loading tables {}", path.display()))?,
            None => TableRegistry::default(),
        };
        let variables = match &args.variables {
            Some(path) => InMemoryVariables::from_snapshot(
                VariableSnapshot::load_from_file(path)
                    .with_context(|| format!("loading variables {}", path.display()))?,
            ),
            None => InMemoryVariables::new(),
        };
        Ok(Self {
            config,
            tables,
            variables,
        })
    }
}

fn render_options(args: &RenderArgs) -> anyhow::Result<RenderOptions> {
    let Some(breakpoint) = Breakpoint::parse(&args.breakpoint) else {
        bail!(
            "unknown breakpoint '{}' (expected desktop, tablet or mobile)",
            args.breakpoint
        );
    };
    let mut options = if args.preview {
        RenderOptions::preview()
    } else {
        RenderOptions::design()
    }
    .with_breakpoint(breakpoint);
    if let Some(width) = args.width {
        options = options.with_canvas_width(width);
    }
    Ok(options)
}

/// Render a page to a standalone HTML document, waiting for its tables
pub async fn render_page_html(page: &Page, inputs: &RenderInputs, options: &RenderOptions) -> String {
    let session = RenderSession::new(inputs.config.clone());
    let classes = page.class_store();
    let tokens = page.token_store();
    let renderer = Renderer::new(&classes, &tokens, &session)
        .with_variables(&inputs.variables)
        .with_reusable(&page.reusable_components);

    let mut node = renderer.render_page(&page.components, options);
    for pass in 1..MAX_PASSES {
        let fetched = session.fetch_pending(&inputs.tables).await;
        if fetched == 0 {
            break;
        }
        tracing::debug!(pass, fetched, "re-rendering after table fetches");
        node = renderer.render_page(&page.components, options);
    }
    render_document(&page.name, &node)
}

pub(crate) async fn render(page_path: &Path, args: &RenderArgs, out: Option<&Path>) -> anyhow::Result<()> {
    let options = render_options(args)?;
    let inputs = RenderInputs::load(args)?;
    let page = load_page(page_path).with_context(|| format!("loading page {}", page_path.display()))?;
    let html = render_page_html(&page, &inputs, &options).await;

    match out {
        Some(out) => {
            std::fs::write(out, &html).with_context(|| format!("writing {}", out.display()))?;
            tracing::info!(page = %page.name, out = %out.display(), "page rendered");
            println!("{} {} -> {}", "✓".green().bold(), page.name.bold(), out.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}

/// Fixture files share the `.json` extension with pages
fn is_fixture(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    [TableRegistry::file_extension(), VariableSnapshot::file_extension()]
        .iter()
        .any(|ext| name.ends_with(&format!(".{ext}")))
}

pub(crate) async fn render_dir(dir: &Path, args: &RenderArgs, out_dir: &Path) -> anyhow::Result<()> {
    let options = render_options(args)?;
    let inputs = RenderInputs::load(args)?;
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rendered = 0usize;
    let mut failed = 0usize;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("scanning {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_page_file(path) || is_fixture(path) {
            continue;
        }
        let page = match load_page(path) {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable page");
                println!("{} {}: {}", "✗".red().bold(), path.display(), err.to_string().red());
                failed += 1;
                continue;
            }
        };
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let target = out_dir.join(relative).with_extension("html");
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let html = render_page_html(&page, &inputs, &options).await;
        std::fs::write(&target, html).with_context(|| format!("writing {}", target.display()))?;
        println!("{} {} -> {}", "✓".green().bold(), relative.display(), target.display());
        rendered += 1;
    }

    tracing::info!(rendered, failed, "directory rendered");
    println!(
        "\n{} page(s) rendered, {} skipped",
        rendered.to_string().green().bold(),
        failed.to_string().yellow()
    );
    Ok(())
}

pub(crate) fn validate(page_path: &Path) -> anyhow::Result<()> {
    let page = load_page(page_path).with_context(|| format!("loading page {}", page_path.display()))?;
    let result = Validator::with_default_rules().validate(&page);

    for warning in &result.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
    for error in &result.errors {
        println!("{} {}", "error:".red().bold(), error);
    }
    if result.has_errors() {
        bail!("{} has {} error(s)", page_path.display(), result.errors.len());
    }
    println!(
        "{} {} is valid ({} warning(s))",
        "✓".green().bold(),
        page.name.bold(),
        result.warnings.len()
    );
    Ok(())
}

pub(crate) fn info(page_path: &Path, json: bool) -> anyhow::Result<()> {
    let preview = preview_page(page_path).with_context(|| format!("reading page {}", page_path.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }
    println!("{}", preview.name.bold());
    println!("  {:<12} {}", "id".dimmed(), preview.id);
    println!("  {:<12} {}", "components".dimmed(), preview.component_count);
    println!("  {:<12} {}", "classes".dimmed(), preview.class_count);
    println!("  {:<12} {}", "tokens".dimmed(), preview.token_count);
    println!("  {:<12} {}", "reusable".dimmed(), preview.reusable_count);
    println!("  {:<12} {}", "schema".dimmed(), preview.schema_version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use weave_ir::{
        AppComponent, ComponentType, FieldDef, FieldType, Record, TableProject, TableSchema,
        VariableScope, VariableStore, save_page,
    };

    fn orders() -> TableProject {
        TableProject::new(
            "Orders",
            TableSchema {
                fields: vec![FieldDef::new("f1", "customer", FieldType::Text)],
            },
        )
        .with_record(Record::new(1, json!({"f1": "Ada"}).as_object().cloned().unwrap()))
        .with_record(Record::new(2, json!({"f1": "Grace"}).as_object().cloned().unwrap()))
    }

    fn page() -> Page {
        Page::new("Orders page")
            .with_component(
                AppComponent::new("title", ComponentType::Heading).with_prop("content", "Hi {{user}}"),
            )
            .with_component(
                AppComponent::new("list", ComponentType::Section)
                    .with_prop("databaseConnection", json!({"tableName": "Orders"}))
                    .with_child(
                        AppComponent::new("row", ComponentType::Text).with_prop("content", "{{customer}}"),
                    ),
            )
    }

    #[test]
    fn test_render_options() {
        let args = RenderArgs {
            preview: true,
            breakpoint: "tablet".into(),
            width: Some(800.0),
            ..Default::default()
        };
        let options = render_options(&args).unwrap();
        assert!(options.is_preview);
        assert_eq!(options.breakpoint, Breakpoint::Tablet);
        assert_eq!(options.canvas_width, Some(800.0));

        let bad = RenderArgs {
            breakpoint: "watch".into(),
            ..Default::default()
        };
        assert!(render_options(&bad).is_err());
    }

    #[tokio::test]
    async fn test_render_waits_for_tables() {
        let inputs = RenderInputs {
            tables: TableRegistry::new(vec![orders()]),
            ..Default::default()
        };
        inputs
            .variables
            .set(VariableScope::App, "user", json!("Linus"))
            .unwrap();
        let html = render_page_html(&page(), &inputs, &RenderOptions::preview()).await;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Orders page</title>"));
        assert!(html.contains("Hi Linus"));
        assert!(html.contains("Ada"));
        assert!(html.contains("Grace"));
        assert!(!html.contains("weave-repeater-loading"));
    }

    #[tokio::test]
    async fn test_missing_table_renders_inline_error() {
        let inputs = RenderInputs::default();
        let html = render_page_html(&page(), &inputs, &RenderOptions::preview()).await;
        assert!(html.contains("weave-repeater-error"));
        assert!(html.contains("Table not found: Orders"));
    }

    #[tokio::test]
    async fn test_render_dir_mirrors_layout() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        std::fs::create_dir_all(src.path().join("shop")).unwrap();
        save_page(&page(), src.path().join("shop/orders.weave")).unwrap();
        TableRegistry::new(vec![orders()])
            .save_to_file(&src.path().join("shop/fixtures.tables.json"))
            .unwrap();
        std::fs::write(src.path().join("notes.txt"), "not a page").unwrap();

        let args = RenderArgs {
            preview: true,
            breakpoint: "desktop".into(),
            data: Some(src.path().join("shop/fixtures.tables.json")),
            ..Default::default()
        };
        render_dir(src.path(), &args, out.path()).await.unwrap();

        let html = std::fs::read_to_string(out.path().join("shop/orders.html")).unwrap();
        assert!(html.contains("Grace"));
        assert!(!out.path().join("shop/fixtures.tables.html").exists());
        assert!(!out.path().join("notes.html").exists());
    }

    #[test]
    fn test_validate_and_info() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.weave");
        save_page(&page(), &path).unwrap();
        validate(&path).unwrap();
        info(&path, true).unwrap();
        assert!(validate(&dir.path().join("missing.weave")).is_err());
    }
}
