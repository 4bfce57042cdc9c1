//! `storelink link` and `storelink validate`: config-driven store linkage.

use std::path::{Path, PathBuf};

use storelink_io::csv::{read_table, write_annotated};
use storelink_linkage::engine::resolve_sources;
use storelink_linkage::schema::{
    ResolvedSchema, SourceSchema, GEOGRAPHY_SCHEMA, REFERENCE_SCHEMA, REGISTRY_SCHEMA,
};
use storelink_linkage::{LinkConfig, LinkError, LinkInput, RawTable};

use crate::exit_codes::{EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_IO, EXIT_MISSING_COLUMNS};
use crate::CliError;

fn link_err(err: LinkError) -> CliError {
    match err {
        LinkError::ConfigParse(_) | LinkError::ConfigValidation(_) => {
            CliError::new(EXIT_INVALID_CONFIG, err.to_string())
        }
        LinkError::MissingColumns { .. } => CliError::new(EXIT_MISSING_COLUMNS, err.to_string())
            .with_hint("run `storelink validate <config>` to see which headers were found"),
    }
}

/// Parsed config plus the directory its relative paths resolve against.
struct LoadedConfig {
    config: LinkConfig,
    base_dir: PathBuf,
}

impl LoadedConfig {
    fn path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }
}

fn load_config(config_path: &Path) -> Result<LoadedConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::new(
            EXIT_IO,
            format!("cannot read config {}: {e}", config_path.display()),
        )
    })?;
    let config = LinkConfig::from_toml(&config_str).map_err(link_err)?;

    // Resolve file paths relative to config file's directory
    let base_dir = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    Ok(LoadedConfig { config, base_dir })
}

fn load_sources(loaded: &LoadedConfig) -> Result<LinkInput, CliError> {
    let delimiter = loaded.config.delimiter_byte().map_err(link_err)?;
    let read = |relative: &str| -> Result<RawTable, CliError> {
        read_table(&loaded.path(relative), delimiter)
            .map_err(|e| CliError::new(EXIT_IO, format!("cannot read {e}")))
    };

    let sources = &loaded.config.sources;
    Ok(LinkInput {
        registry: read(&sources.registry)?,
        geography: read(&sources.geography)?,
        reference: read(&sources.reference)?,
    })
}

pub fn cmd_link(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let loaded = load_config(&config_path)?;
    let input = load_sources(&loaded)?;

    let result = storelink_linkage::run(&loaded.config, &input).map_err(link_err)?;

    let csv_path = output_file.unwrap_or_else(|| loaded.path(&loaded.config.output.csv));
    write_annotated(&csv_path, &result.table)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot write output: {e}")))?;
    eprintln!("wrote {}", csv_path.display());

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref report) = loaded.config.output.json {
        let report_path = loaded.path(report);
        std::fs::write(&report_path, &json_str)
            .map_err(|e| CliError::new(EXIT_IO, format!("cannot write report: {e}")))?;
        eprintln!("wrote {}", report_path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{} registry rows: {} kept, {} outside boundary, {} not {}, {} missing name and address",
        s.registry_rows,
        s.retained,
        s.outside_boundary,
        s.other_jurisdiction,
        result.meta.jurisdiction,
        s.missing_identity,
    );
    eprintln!(
        "healthy: {} of {} ({} by name, {} by address, {} by both)",
        s.healthy, s.retained, s.matched_by_name, s.matched_by_address, s.matched_by_both,
    );
    if s.reference_without_zip > 0 {
        eprintln!(
            "note: {} reference rows had no usable ZIP and were ignored",
            s.reference_without_zip
        );
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let loaded = load_config(&config_path)?;
    let input = load_sources(&loaded)?;
    let schemas = resolve_sources(&input).map_err(link_err)?;

    let sources = &loaded.config.sources;
    print_mapping(&REGISTRY_SCHEMA, &schemas.registry, &sources.registry, &input.registry);
    print_mapping(&GEOGRAPHY_SCHEMA, &schemas.geography, &sources.geography, &input.geography);
    print_mapping(&REFERENCE_SCHEMA, &schemas.reference, &sources.reference, &input.reference);

    eprintln!("config ok: {}", loaded.config.name);
    Ok(())
}

fn print_mapping(schema: &SourceSchema, resolved: &ResolvedSchema, file: &str, table: &RawTable) {
    println!("{} ({}, {} rows):", schema.source, file, table.len());
    for spec in schema.fields {
        let field = spec.field.to_string();
        match resolved.get(spec.field) {
            Some(col) => println!(
                "  {:<16} <- {:?} (column {})",
                field,
                col.header,
                col.index + 1
            ),
            None => println!("  {:<16} <- (not found, optional)", field),
        }
    }
}
