//! Output formatting: JSON, compact JSON, YAML.
//!
//! List commands can also print bare IDs (`--id-only`) or drop the page
//! metadata (`--hide-page`).

use std::io::{self, Write};

use serde::Serialize;

use unified_api::types::Page;

use crate::cli::{OutputFormat, PageArgs};
use crate::error::CliError;

/// Render any serializable value in the chosen format.
pub fn render<T: Serialize + ?Sized>(format: OutputFormat, data: &T) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(render_err)?,
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(render_err)?,
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(render_err)?,
    };
    Ok(rendered.trim_end().to_owned())
}

fn render_err(e: impl std::fmt::Display) -> CliError {
    CliError::Render(e.to_string())
}

/// Render a Network list page honoring `--id-only` and `--hide-page`.
pub fn render_page<T: Serialize>(
    format: OutputFormat,
    page: &Page<T>,
    args: &PageArgs,
    id_fn: impl Fn(&T) -> &str,
) -> Result<String, CliError> {
    if args.id_only {
        return Ok(page.data.iter().map(id_fn).collect::<Vec<_>>().join("\n"));
    }
    if args.hide_page {
        return render(format, &page.data);
    }
    render(format, page)
}

/// Print to stdout. Empty output prints nothing.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print one value in the chosen format.
pub fn print<T: Serialize + ?Sized>(format: OutputFormat, data: &T) -> Result<(), CliError> {
    print_output(&render(format, data)?);
    Ok(())
}
