use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use xmltree::{Element, XMLNode};

use crate::{read_inventory, write_inventory, ExportOptions};

use super::VerifyArgs;

pub(crate) fn run_verify(args: VerifyArgs) -> Result<()> {
    let mut file = File::open(&args.r#in)
        .with_context(|| format!("Failed to open input file: {}", args.r#in.display()))?;
    let mut input_buf = Vec::new();
    file.read_to_end(&mut input_buf)
        .with_context(|| format!("Failed to read input file: {}", args.r#in.display()))?;

    let inventory = read_inventory(Cursor::new(&input_buf))
        .with_context(|| format!("Failed to read inventory: {}", args.r#in.display()))?;

    let mut output_buf = Vec::new();
    write_inventory(&inventory, &mut output_buf, &ExportOptions::default())?;

    let input_str = normalize_xml(&input_buf)
        .with_context(|| format!("Failed to normalize input: {}", args.r#in.display()))?;
    let output_str = normalize_xml(&output_buf).context("Failed to normalize exported output")?;

    if input_str == output_str {
        if !args.quiet {
            println!("No changes.");
        }
        return Ok(());
    }

    if !args.quiet {
        let diff = similar::TextDiff::from_lines(&input_str, &output_str);
        let mut out = io::stdout().lock();
        let unified = diff
            .unified_diff()
            .context_radius(3)
            .header("original", "canonical")
            .to_string();
        write!(out, "{}", unified)?;
    }

    Err(anyhow::anyhow!("verify: changes detected"))
}

/// Re-emit a document with sorted attributes, trimmed text and fixed
/// indentation so that only content differences show up in the diff.
fn normalize_xml(input: &[u8]) -> Result<String> {
    let root = Element::parse(Cursor::new(input)).context("Failed to parse XML")?;
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_element(&root, 0, &mut out);
    Ok(out)
}

fn write_element(el: &Element, indent: usize, out: &mut String) {
    let indent_str = " ".repeat(indent);
    out.push_str(&indent_str);
    out.push('<');
    out.push_str(&el.name);

    let mut attrs: Vec<_> = el.attributes.iter().collect();
    attrs.sort_by(|a, b| a.0.cmp(b.0));
    for (k, v) in attrs {
        out.push(' ');
        out.push_str(k);
        out.push_str("=\"");
        out.push_str(&escape_xml(v));
        out.push('"');
    }

    let children: Vec<&XMLNode> = el
        .children
        .iter()
        .filter(|child| match child {
            XMLNode::Text(text) => !text.trim().is_empty(),
            XMLNode::Comment(_) | XMLNode::ProcessingInstruction(..) => false,
            _ => true,
        })
        .collect();

    if children.is_empty() {
        out.push_str(" />\n");
        return;
    }

    if let [XMLNode::Text(text)] = children.as_slice() {
        out.push('>');
        out.push_str(&escape_xml(text.trim()));
        out.push_str("</");
        out.push_str(&el.name);
        out.push_str(">\n");
        return;
    }

    out.push_str(">\n");
    for child in children {
        match child {
            XMLNode::Element(child_el) => write_element(child_el, indent + 2, out),
            XMLNode::Text(text) => {
                out.push_str(&" ".repeat(indent + 2));
                out.push_str(&escape_xml(text.trim()));
                out.push('\n');
            }
            XMLNode::CData(data) => {
                out.push_str(&" ".repeat(indent + 2));
                out.push_str("<![CDATA[");
                out.push_str(data);
                out.push_str("]]>\n");
            }
            XMLNode::Comment(_) | XMLNode::ProcessingInstruction(..) => {}
        }
    }

    out.push_str(&indent_str);
    out.push_str("</");
    out.push_str(&el.name);
    out.push_str(">\n");
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
