use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, info_span};

use order_match_cli::import::{
    read_catalog_path, read_reference_names, read_requests_path, IntakeOptions,
};
use order_match_core::{Database, MatchConfig, MatchEngine, MatchExport, Reconciler};

use crate::cli::{CompareArgs, ImportArgs, MatchArgs, OutputFormatArg, ReferenceArgs};

pub fn open_database(path: &Path) -> Result<Database> {
    Database::open(path).with_context(|| format!("open database {}", path.display()))
}

pub fn load_engine(config_path: Option<&Path>) -> Result<MatchEngine> {
    let Some(path) = config_path else {
        return Ok(MatchEngine::new());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let config = MatchConfig::from_json(&json)
        .with_context(|| format!("parse config {}", path.display()))?;
    MatchEngine::with_config(config).context("build match engine")
}

fn intake_options(args: &ImportArgs) -> Result<IntakeOptions> {
    let delimiter = u8::try_from(args.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter {:?} is not a single ASCII character", args.delimiter))?;
    Ok(IntakeOptions {
        delimiter,
        skip_rows: args.skip_rows,
    })
}

pub fn run_import_catalog(db: &mut Database, args: &ImportArgs) -> Result<()> {
    let _span = info_span!("import_catalog", path = %args.path.display()).entered();

    let entries = read_catalog_path(&args.path, &intake_options(args)?)
        .with_context(|| format!("read catalog {}", args.path.display()))?;
    let count = db.replace_catalog(&entries).context("store catalog")?;
    let groups = db.list_department_groups().context("list department groups")?;

    info!(entries = count, groups = groups.len(), "Catalog imported");
    Ok(())
}

pub fn run_import_requests(db: &mut Database, args: &ImportArgs) -> Result<()> {
    let _span = info_span!("import_requests", path = %args.path.display()).entered();

    let lines = read_requests_path(&args.path, &intake_options(args)?)
        .with_context(|| format!("read order {}", args.path.display()))?;
    let count = db.replace_request_lines(&lines).context("store order lines")?;

    info!(lines = count, "Order imported");
    Ok(())
}

pub fn run_add_reference(db: &mut Database, args: &ReferenceArgs) -> Result<()> {
    let mut names = args.names.clone();
    if let Some(path) = &args.file {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        names.extend(read_reference_names(file).with_context(|| format!("read {}", path.display()))?);
    }
    if names.is_empty() && !args.replace {
        bail!("no reference names given");
    }

    let added = if args.replace {
        db.replace_reference_names(names.as_slice())
            .context("replace reference names")?
    } else {
        let mut added = 0;
        for name in &names {
            if db.add_reference_name(name).context("add reference name")? {
                added += 1;
            }
        }
        added
    };

    info!(added, given = names.len(), "Reference list updated");
    Ok(())
}

pub fn run_match(db: &Database, engine: MatchEngine, args: &MatchArgs) -> Result<()> {
    let mut reconciler = Reconciler::new(db).with_engine(engine);
    if !args.groups.is_empty() {
        reconciler = reconciler.with_allowed_groups(args.groups.clone());
    }

    let run = match &args.department {
        Some(group) => reconciler.run_for_group(group),
        None => reconciler.run(),
    }
    .context("match order lines")?;

    let export = MatchExport::from_run(&run);
    let text = match args.format {
        OutputFormatArg::Jsonl => export.to_json_lines().context("serialize records")?,
        OutputFormatArg::Json => {
            let mut text = export.to_json().context("serialize export")?;
            text.push('\n');
            text
        }
        OutputFormatArg::Csv => export.to_csv().context("write CSV")?,
    };

    match &args.output {
        Some(path) => fs::write(path, text).with_context(|| format!("write {}", path.display()))?,
        None => io::stdout()
            .lock()
            .write_all(text.as_bytes())
            .context("write to stdout")?,
    }

    info!(
        department_group = %run.department_group,
        total = export.summary.total,
        matched = export.summary.matched,
        sales_warnings = export.summary.sales_warnings,
        "Match finished"
    );
    Ok(())
}

pub fn run_compare(engine: &MatchEngine, args: &CompareArgs) -> Result<()> {
    let score = engine.score_pair(&args.name_a, args.price_a, &args.name_b, args.price_b);
    let report = serde_json::json!({
        "name_a": engine.decompose(&args.name_a),
        "name_b": engine.decompose(&args.name_b),
        "score": score,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize score")?
    );
    Ok(())
}

pub fn run_groups(db: &Database) -> Result<()> {
    for group in db.list_department_groups().context("list department groups")? {
        println!("{group}");
    }
    Ok(())
}
