use std::io::{self, Write};
use videotree_models::{Node, Traversal};
use videotree_utils::{format_duration, format_size};

/// Writes the tree as indented text, one label per line.
pub fn write_tree<W: Write>(out: &mut W, traversal: &Traversal) -> io::Result<()> {
    writeln!(out, "{}", traversal.root.label)?;
    write_children(out, &traversal.root, "")
}

fn write_children<W: Write>(out: &mut W, node: &Node, prefix: &str) -> io::Result<()> {
    let count = node.children.len();

    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == count;
        let (branch, indent) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };

        writeln!(out, "{prefix}{branch}{}", child.label)?;
        if !child.is_leaf() {
            write_children(out, child, &format!("{prefix}{indent}"))?;
        }
    }

    Ok(())
}

pub fn write_json<W: Write>(out: &mut W, traversal: &Traversal) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, traversal)?;
    writeln!(out)
}

pub fn write_summary<W: Write>(out: &mut W, traversal: &Traversal) -> io::Result<()> {
    let report = &traversal.report;
    writeln!(
        out,
        "{} directories, {} videos, {} total, {} in {:.2?}",
        report.directories_visited,
        report.videos_found,
        format_duration(traversal.root.duration),
        format_size(traversal.root.size),
        report.elapsed
    )?;

    if report.probe_failures > 0 {
        writeln!(out, "{} files could not be probed and count as 00:00:00", report.probe_failures)?;
    }

    for warning in &traversal.warnings {
        writeln!(out, "warning: {} skipped: {}", warning.path.display(), warning.reason)?;
    }

    Ok(())
}
