//! Model and query file loaders.
//!
//! Files ending in `.json` are read as JSON, anything else as the
//! line-oriented text format:
//!
//! ```text
//! # name;parents;features;shape;probabilities
//! D;;Easy,Hard;2;0.6,0.4
//! G;I,D;A,B,C;2,2,3;0.3,0.4,0.3,0.05,0.25,0.7,0.9,0.08,0.02,0.5,0.3,0.2
//! ```
//!
//! and for queries, `target|evidence` with `name=value` lists:
//!
//! ```text
//! G=A
//! L=Strong|I=Low,D=Hard
//! ```

use anyhow::{bail, Context, Result};
use bnet_core::{Assignment, BayesianNetwork, Query, VariableSpec};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Text,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => FileFormat::Text,
        }
    }
}

/// Non-blank, non-comment lines with their 1-based line numbers.
fn content_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn split_list(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_shape(field: &str) -> Result<Option<Vec<usize>>> {
    let dims = split_list(field)
        .iter()
        .map(|d| d.parse::<usize>().with_context(|| format!("invalid shape entry {d:?}")))
        .collect::<Result<Vec<_>>>()?;
    Ok(match dims.len() {
        0 => None,
        1 => Some(vec![1, dims[0]]),
        _ => Some(dims),
    })
}

fn parse_model_line(line: &str) -> Result<VariableSpec> {
    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    if fields.len() != 5 {
        bail!("expected 5 ';'-separated fields, found {}", fields.len());
    }
    let name = fields[0];
    if name.is_empty() {
        bail!("variable name is empty");
    }
    let probabilities = split_list(fields[4])
        .iter()
        .map(|p| p.parse::<f64>().with_context(|| format!("invalid probability {p:?}")))
        .collect::<Result<Vec<_>>>()?;

    Ok(VariableSpec {
        name: name.to_string(),
        parents: split_list(fields[1]),
        features: split_list(fields[2]),
        shape: parse_shape(fields[3])?,
        probabilities,
    })
}

pub fn parse_model_text(input: &str) -> Result<Vec<VariableSpec>> {
    content_lines(input)
        .map(|(n, line)| parse_model_line(line).with_context(|| format!("model line {n}")))
        .collect()
}

pub fn parse_model_json(input: &str) -> Result<Vec<VariableSpec>> {
    serde_json::from_str(input).context("invalid JSON model")
}

pub fn parse_model(input: &str, format: FileFormat) -> Result<Vec<VariableSpec>> {
    match format {
        FileFormat::Text => parse_model_text(input),
        FileFormat::Json => parse_model_json(input),
    }
}

/// Parse a model and build the network from it.
pub fn build_network(input: &str, format: FileFormat) -> Result<BayesianNetwork> {
    let specs = parse_model(input, format)?;
    tracing::debug!(variables = specs.len(), "model parsed");
    let network = BayesianNetwork::from_specs(&specs).context("invalid model")?;
    Ok(network)
}

pub fn load_model(path: &Path) -> Result<BayesianNetwork> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model {}", path.display()))?;
    let network = build_network(&input, FileFormat::from_path(path))
        .with_context(|| format!("failed to load model {}", path.display()))?;
    tracing::info!(variables = network.len(), path = %path.display(), "model loaded");
    Ok(network)
}

fn parse_pairs(field: &str) -> Result<Assignment> {
    let mut out = Assignment::new();
    for item in split_list(field) {
        let Some((name, value)) = item.split_once('=') else {
            bail!("expected name=value, found {item:?}");
        };
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            bail!("expected name=value, found {item:?}");
        }
        if out.insert(name.to_string(), value.to_string()).is_some() {
            bail!("variable {name} is assigned twice");
        }
    }
    Ok(out)
}

fn parse_query_line(line: &str) -> Result<Query> {
    let (target, evidence) = match line.split_once('|') {
        Some((t, e)) => (t, e),
        None => (line, ""),
    };
    let target = parse_pairs(target)?;
    let evidence = parse_pairs(evidence)?;
    Ok(Query::new(target, (!evidence.is_empty()).then_some(evidence)))
}

pub fn parse_queries_text(input: &str) -> Result<Vec<Query>> {
    content_lines(input)
        .map(|(n, line)| parse_query_line(line).with_context(|| format!("query line {n}")))
        .collect()
}

pub fn parse_queries_json(input: &str) -> Result<Vec<Query>> {
    serde_json::from_str(input).context("invalid JSON queries")
}

pub fn parse_queries(input: &str, format: FileFormat) -> Result<Vec<Query>> {
    match format {
        FileFormat::Text => parse_queries_text(input),
        FileFormat::Json => parse_queries_json(input),
    }
}

pub fn load_queries(path: &Path) -> Result<Vec<Query>> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read queries {}", path.display()))?;
    let queries = parse_queries(&input, FileFormat::from_path(path))
        .with_context(|| format!("failed to load queries {}", path.display()))?;
    tracing::info!(queries = queries.len(), path = %path.display(), "queries loaded");
    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUDENT: &str = "\
# student network
D;;Easy,Hard;2;0.6,0.4
I;;Low,High;2;0.7,0.3

G;I,D;A,B,C;2,2,3;0.3,0.4,0.3,0.05,0.25,0.7,0.9,0.08,0.02,0.5,0.3,0.2
S;I;Low,High;2,2;0.95,0.05,0.2,0.8
L;G;Weak,Strong;3,2;0.1,0.9,0.4,0.6,0.99,0.01
";

    #[test]
    fn test_parse_text_model() {
        let specs = parse_model_text(STUDENT).unwrap();
        assert_eq!(specs.len(), 5);
        assert_eq!(specs[0].shape, Some(vec![1, 2]));
        assert!(specs[0].parents.is_empty());
        assert_eq!(specs[2].parents, vec!["I", "D"]);
        assert_eq!(specs[2].shape, Some(vec![2, 2, 3]));
        assert_eq!(specs[4].probabilities.len(), 6);
    }

    #[test]
    fn test_text_model_builds_network() {
        let network = build_network(STUDENT, FileFormat::Text).unwrap();
        assert_eq!(network.len(), 5);
        assert_eq!(network.topological_order().unwrap().len(), 5);
    }

    #[test]
    fn test_text_model_errors_name_line() {
        let err = parse_model_text("D;;Easy,Hard;2;0.6,0.4\n\nI;;Low,High;2;0.7,x\n").unwrap_err();
        assert!(format!("{err:#}").contains("model line 3"), "{err:#}");

        let err = parse_model_text("D;Easy,Hard;2;0.6,0.4").unwrap_err();
        assert!(format!("{err:#}").contains("5 ';'-separated fields"));
    }

    #[test]
    fn test_missing_parent_is_rejected() {
        let err = build_network("L;G;Weak,Strong;3,2;0.1,0.9,0.4,0.6,0.99,0.01", FileFormat::Text)
            .unwrap_err();
        assert!(format!("{err:#}").contains("missing parent G"), "{err:#}");
    }

    #[test]
    fn test_parse_json_model() {
        let json = r#"[
            {"name": "Coin", "features": ["A", "B"], "probabilities": [0.5, 0.5]},
            {"name": "Echo", "features": ["A", "B"], "parents": ["Coin"],
             "probabilities": [0.9, 0.1, 0.1, 0.9], "shape": [2, 2]}
        ]"#;
        let network = build_network(json, FileFormat::Json).unwrap();
        assert_eq!(network.len(), 2);
    }

    #[test]
    fn test_parse_text_queries() {
        let queries =
            parse_queries_text("G=A\n# comment\nL=Strong|I=Low, D=Hard\nD=Easy|\n").unwrap();
        assert_eq!(queries.len(), 3);
        assert!(queries[0].evidence.is_none());
        assert_eq!(queries[1].signature().as_str(), "D:Hard,I:Low");
        assert!(queries[2].evidence.is_none());

        let err = parse_queries_text("G=A\nL|I=Low").unwrap_err();
        assert!(format!("{err:#}").contains("query line 2"));
        assert!(parse_queries_text("G=A,G=B").is_err());
    }

    #[test]
    fn test_parse_json_queries() {
        let queries = parse_queries(
            r#"[{"target": {"G": "A"}}, {"target": {"D": "Easy"}, "evidence": {"L": "Weak"}}]"#,
            FileFormat::Json,
        )
        .unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].signature().as_str(), "L:Weak");
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("m.json")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("m.JSON")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("model.txt")), FileFormat::Text);
        assert_eq!(FileFormat::from_path(Path::new("model")), FileFormat::Text);
    }
}
