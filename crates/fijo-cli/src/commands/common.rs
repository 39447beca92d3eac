//! Shared CLI helpers used across multiple commands.

use std::path::Path;
use std::str::FromStr;

use fijo_config::FilterSpec;
use fijo_core::Filter;

/// Load a filter description file and build the runnable filter.
///
/// The format is chosen by extension: `.toml` is parsed as TOML, anything
/// else as the native line format.
pub fn load_filter(path: &Path) -> anyhow::Result<Filter> {
    let spec = FilterSpec::load(path)?;
    let filter = spec.build()?;
    tracing::debug!(
        "loaded '{}': {} nodes, input '{}', output '{}'",
        path.display(),
        filter.node_count(),
        filter.input_name(),
        filter.output_name()
    );
    Ok(filter)
}

/// Parse a comma-separated sample list, e.g. `255,-128,0` or `0.5,-0.25`.
pub fn parse_samples<T: FromStr>(text: &str) -> anyhow::Result<Vec<T>> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<T>()
                .map_err(|_| anyhow::anyhow!("invalid sample value '{part}'"))
        })
        .collect()
}

/// Read samples from a file, one per line. Blank lines and text after `#`
/// are skipped.
pub fn read_samples_file<T: FromStr>(path: &Path) -> anyhow::Result<Vec<T>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => anyhow::bail!("failed to read data file '{}': {err}", path.display()),
    };
    text.lines()
        .map(|line| match line.find('#') {
            Some(pos) => line[..pos].trim(),
            None => line.trim(),
        })
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<T>()
                .map_err(|_| anyhow::anyhow!("invalid sample value '{line}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_samples_integers() {
        let samples: Vec<i64> = parse_samples("255, -128,0").unwrap();
        assert_eq!(samples, [255, -128, 0]);
    }

    #[test]
    fn parse_samples_normalized() {
        let samples: Vec<f64> = parse_samples("0.5,-0.25").unwrap();
        assert_eq!(samples, [0.5, -0.25]);
    }

    #[test]
    fn parse_samples_trailing_comma() {
        let samples: Vec<i64> = parse_samples("1,2,").unwrap();
        assert_eq!(samples, [1, 2]);
    }

    #[test]
    fn parse_samples_rejects_garbage() {
        let result = parse_samples::<i64>("1,two,3");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("two"));
    }
}
