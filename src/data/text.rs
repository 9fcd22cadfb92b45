//! Line-oriented edge list and Pajek readers

use anyhow::{Context, Result};
use crate::graph::{GraphBuilder, ModularityGraph};
use std::fs;
use std::path::Path;

/// Parse `src dst [weight]`, weight defaulting to 1
///
/// Lines that do not start with two integers, or whose third token is not a
/// number, are skipped.
fn parse_edge_line(line: &str) -> Option<(i64, i64, f64)> {
    let mut tokens = line.split_whitespace();
    let source = tokens.next()?.parse().ok()?;
    let destination = tokens.next()?.parse().ok()?;
    let weight = match tokens.next() {
        Some(token) => token.parse().ok()?,
        None => 1.0,
    };
    Some((source, destination, weight))
}

fn read_lines(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("File {} can not be opened", path.display()))
}

/// Read a directed edge list, shifting ids so the smallest becomes 0
pub fn read_edgelist(
    path: &Path,
    modularity_resolution: f64,
    treat_as_modularity: bool,
) -> Result<ModularityGraph> {
    let contents = read_lines(path)?;
    let mut builder = GraphBuilder::with_capacity(contents.lines().count())
        .directed(true)
        .resolution(modularity_resolution)
        .treat_as_modularity(treat_as_modularity);

    for (source, destination, weight) in contents.lines().filter_map(parse_edge_line) {
        builder.add_edge(source, destination, weight);
    }
    log::debug!("Parsed {} edges from {}", builder.edge_count(), path.display());

    builder
        .build()
        .with_context(|| format!("Invalid edge list {}", path.display()))
}

/// Read a Pajek `.net` file
///
/// Vertex lines before the first `*edges` / `*arcs` header widen the id
/// range; `*edges` sections are undirected and `*arcs` sections directed.
pub fn read_pajek(
    path: &Path,
    modularity_resolution: f64,
    treat_as_modularity: bool,
) -> Result<ModularityGraph> {
    let contents = read_lines(path)?;
    let mut builder = GraphBuilder::with_capacity(contents.lines().count())
        .resolution(modularity_resolution)
        .treat_as_modularity(treat_as_modularity);
    let mut in_vertices = true;

    for line in contents.lines() {
        let Some(first) = line.split_whitespace().next() else {
            continue;
        };
        match first.to_lowercase().as_str() {
            "*edges" => {
                in_vertices = false;
                builder.set_directed(false);
            }
            "*arcs" => {
                in_vertices = false;
                builder.set_directed(true);
            }
            _ if in_vertices => {
                if let Ok(vertex) = first.parse::<i64>() {
                    builder.add_vertex(vertex);
                }
            }
            _ => {
                if let Some((source, destination, weight)) = parse_edge_line(line) {
                    builder.add_edge(source, destination, weight);
                }
            }
        }
    }
    log::debug!("Parsed {} edges from {}", builder.edge_count(), path.display());

    builder
        .build()
        .with_context(|| format!("Invalid Pajek file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_edge_line() {
        assert_eq!(parse_edge_line("1 2"), Some((1, 2, 1.0)));
        assert_eq!(parse_edge_line("  3\t4 0.5 "), Some((3, 4, 0.5)));
        assert_eq!(parse_edge_line("# comment"), None);
        assert_eq!(parse_edge_line("1 2 heavy"), None);
        assert_eq!(parse_edge_line(""), None);
    }

    #[test]
    fn test_edgelist_is_directed_and_shifted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "g.edgelist", "10 11 2\n11 12\nnot an edge\n12 10\n");
        let graph = read_edgelist(&path, 1.0, false).unwrap();
        assert_eq!(graph.size(), 3);
        assert!(graph.is_directed());
    }

    #[test]
    fn test_pajek_sections() {
        let dir = tempfile::tempdir().unwrap();
        let contents = "*Vertices 4\n1 \"a\"\n2 \"b\"\n3 \"c\"\n4 \"d\"\n*Edges\n1 2 1\n3 4\n";
        let path = write_file(&dir, "g.net", contents);
        let graph = read_pajek(&path, 1.0, false).unwrap();
        assert_eq!(graph.size(), 4);
        assert!(!graph.is_directed());

        let arcs = write_file(&dir, "d.net", "*Vertices 2\n*Arcs\n1 2 3.5\n");
        assert!(read_pajek(&arcs, 1.0, false).unwrap().is_directed());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_edgelist(&dir.path().join("missing.edgelist"), 1.0, false).is_err());
    }
}
